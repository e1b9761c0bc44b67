use thiserror::Error;

use docflow_core::{ApiError, DocumentId, DomainError};

use crate::document::DocumentStatus;

/// Why an action was refused locally, before any remote call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Refusal {
    #[error("no transition from {from} to {to}")]
    IllegalTransition {
        from: DocumentStatus,
        to: DocumentStatus,
    },

    #[error("not permitted to {action} a {status} document")]
    NotPermitted {
        action: &'static str,
        status: DocumentStatus,
    },

    #[error("only submitters can create documents")]
    CreateNotPermitted,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("not signed in")]
    NotAuthenticated,

    #[error("refused: {0}")]
    Refused(Refusal),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("document {0} is not available")]
    NotFound(DocumentId),

    #[error("remote call failed: {0}")]
    Api(#[from] ApiError),

    /// The owning view was closed; the result was discarded.
    #[error("cancelled")]
    Cancelled,
}

impl From<Refusal> for WorkflowError {
    fn from(refusal: Refusal) -> Self {
        WorkflowError::Refused(refusal)
    }
}

impl WorkflowError {
    pub fn is_refusal(&self) -> bool {
        matches!(self, WorkflowError::Refused(_))
    }
}
