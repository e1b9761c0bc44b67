//! Outbound ports of the workflow engine.
//!
//! `DocumentApi` is implemented by the HTTP adapter in `docflow-client`;
//! `Confirm`, `Notifier` and `PdfRenderer` by whatever surface hosts the engine
//! (terminal, GUI, test fakes).

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use docflow_core::{ApiResult, DocumentId, ListResponse};

use crate::document::{Document, DocumentStatus, NewDocument};
use crate::query::DocumentListRequest;

/// Body of `PATCH /document/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
}

impl DocumentPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            status: None,
        }
    }
}

#[async_trait]
pub trait DocumentApi: Send + Sync {
    async fn list(&self, request: &DocumentListRequest) -> ApiResult<ListResponse<Document>>;

    async fn get(&self, id: &DocumentId) -> ApiResult<Document>;

    /// Multipart upload of `name`, `status` and `file`.
    async fn create(&self, document: &NewDocument, status: DocumentStatus) -> ApiResult<Document>;

    async fn update(&self, id: &DocumentId, patch: &DocumentPatch) -> ApiResult<Document>;

    async fn send_to_review(&self, id: &DocumentId) -> ApiResult<Document>;

    async fn revoke_review(&self, id: &DocumentId) -> ApiResult<Document>;

    async fn change_status(&self, id: &DocumentId, status: DocumentStatus) -> ApiResult<Document>;

    async fn delete(&self, id: &DocumentId) -> ApiResult<()>;
}

/// A yes/no question put to the user before a destructive action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationPrompt {
    pub title: String,
    pub message: String,
    pub confirm_text: String,
    pub cancel_text: String,
    pub destructive: bool,
}

impl ConfirmationPrompt {
    pub fn delete(name: &str) -> Self {
        Self {
            title: "Delete Document".to_string(),
            message: format!("Are you sure you want to delete \"{name}\"?"),
            confirm_text: "Delete".to_string(),
            cancel_text: "Cancel".to_string(),
            destructive: true,
        }
    }

    pub fn revoke(name: &str) -> Self {
        Self {
            title: "Revoke Document".to_string(),
            message: format!("Are you sure you want to revoke \"{name}\" from review?"),
            confirm_text: "Revoke".to_string(),
            cancel_text: "Cancel".to_string(),
            destructive: false,
        }
    }

    pub fn submit(name: &str) -> Self {
        Self {
            title: "Submit for Review".to_string(),
            message: format!("Are you sure you want to submit \"{name}\" for review?"),
            confirm_text: "Submit".to_string(),
            cancel_text: "Cancel".to_string(),
            destructive: false,
        }
    }
}

#[async_trait]
pub trait Confirm: Send + Sync {
    /// `true` only on an affirmative answer.
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);
}

/// Opaque handle to a loaded PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderHandle(pub u64);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to render document: {0}")]
pub struct RenderError(pub String);

/// PDF display capability. The engine never looks inside it.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn load(&self, container: &str, url: &str) -> Result<RenderHandle, RenderError>;

    fn unload(&self, handle: RenderHandle);
}
