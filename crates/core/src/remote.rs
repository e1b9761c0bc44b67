//! Remote port error model and list envelope.
//!
//! Every outbound port (auth, users, documents) reports failures with
//! [`ApiError`], independent of the transport that implements it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Missing, expired or rejected credentials.
    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    /// The server refused the change because its state no longer matches
    /// what the client assumed (e.g. a concurrent status change).
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("API error ({0}): {1}")]
    Api(u16, String),

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Map a non-success HTTP status (and its body) onto the error model.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound,
            409 => ApiError::Conflict(body.into()),
            _ => ApiError::Api(status, body.into()),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Conflict(_))
    }
}

/// List envelope returned by paginated endpoints: `{ results, count }`.
///
/// `count` is the total for the active filter, not `results.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub results: Vec<T>,
    pub count: u64,
}

impl<T> Default for ListResponse<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            count: 0,
        }
    }
}
