use core::fmt;
use core::str::FromStr;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docflow_auth::User;
use docflow_core::{DocumentId, DomainError};

/// Lifecycle status of a document. The six values are the complete
/// vocabulary; nothing else is accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Draft,
    ReadyForReview,
    UnderReview,
    Approved,
    Declined,
    Revoked,
}

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 6] = [
        DocumentStatus::Draft,
        DocumentStatus::ReadyForReview,
        DocumentStatus::UnderReview,
        DocumentStatus::Approved,
        DocumentStatus::Declined,
        DocumentStatus::Revoked,
    ];

    /// Wire name, e.g. `READY_FOR_REVIEW`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "DRAFT",
            DocumentStatus::ReadyForReview => "READY_FOR_REVIEW",
            DocumentStatus::UnderReview => "UNDER_REVIEW",
            DocumentStatus::Approved => "APPROVED",
            DocumentStatus::Declined => "DECLINED",
            DocumentStatus::Revoked => "REVOKED",
        }
    }

    /// Display label, e.g. `Ready For Review`.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "Draft",
            DocumentStatus::ReadyForReview => "Ready For Review",
            DocumentStatus::UnderReview => "Under Review",
            DocumentStatus::Approved => "Approved",
            DocumentStatus::Declined => "Declined",
            DocumentStatus::Revoked => "Revoked",
        }
    }

    /// No transition leaves these states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Approved | DocumentStatus::Declined)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = DomainError;

    /// Accepts the wire name in any case, with `-` or `_` separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        DocumentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| DomainError::parse("document status", s))
    }
}

/// A document as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub name: String,
    pub status: DocumentStatus,
    #[serde(default)]
    pub file_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Whether `user` created this document. A document without a creator is
    /// owned by nobody.
    pub fn owned_by(&self, user: &User) -> bool {
        self.creator.as_ref().is_some_and(|c| c.id == user.id)
    }

    pub fn require_id(&self) -> Result<&DocumentId, DomainError> {
        self.id
            .as_ref()
            .ok_or_else(|| DomainError::invalid_id("document has not been created yet"))
    }
}

/// File content to upload with a new document.
#[derive(Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(Self::new(file_name, bytes))
    }

    /// File name without its last extension; the whole name when there is
    /// no extension or the name starts with the only dot.
    pub fn default_name(&self) -> &str {
        match self.file_name.rfind('.') {
            Some(idx) if idx > 0 => &self.file_name[..idx],
            _ => &self.file_name,
        }
    }
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Validated input for creating a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub name: String,
    pub file: FileUpload,
}

impl NewDocument {
    pub fn new(name: impl Into<String>, file: FileUpload) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("document name is required"));
        }
        if file.bytes.is_empty() {
            return Err(DomainError::validation("a non-empty file is required"));
        }
        Ok(Self { name, file })
    }

    /// Name the document after its file.
    pub fn from_file(file: FileUpload) -> Result<Self, DomainError> {
        let name = file.default_name().to_string();
        Self::new(name, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_auth::Role;
    use docflow_core::UserId;

    fn user(id: &str) -> User {
        User {
            id: UserId::new(id),
            email: format!("{id}@corp.io"),
            full_name: id.to_string(),
            role: Role::Submitter,
        }
    }

    #[test]
    fn status_wire_names_and_labels() {
        assert_eq!(
            serde_json::to_string(&DocumentStatus::ReadyForReview).unwrap(),
            "\"READY_FOR_REVIEW\""
        );
        assert_eq!(DocumentStatus::ReadyForReview.label(), "Ready For Review");
        assert_eq!(
            "under-review".parse::<DocumentStatus>().unwrap(),
            DocumentStatus::UnderReview
        );
    }

    #[test]
    fn legacy_status_names_are_rejected() {
        for legacy in ["PENDING_REVIEW", "IN_REVIEW", "REJECTED", "WITHDRAWN"] {
            assert!(legacy.parse::<DocumentStatus>().is_err());
            assert!(serde_json::from_str::<DocumentStatus>(&format!("\"{legacy}\"")).is_err());
        }
    }

    #[test]
    fn deserializes_server_document() {
        let json = r#"{
            "id": "d-1",
            "name": "Invoice",
            "status": "DRAFT",
            "fileUrl": "https://files/d-1.pdf",
            "creator": {"id": "u-1", "email": "a@corp.io", "fullName": "A", "role": "USER"},
            "createdAt": "2024-05-01T10:00:00Z"
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();

        assert_eq!(doc.id, Some(DocumentId::new("d-1")));
        assert_eq!(doc.status, DocumentStatus::Draft);
        assert!(doc.owned_by(&user("u-1")));
        assert!(!doc.owned_by(&user("u-2")));
        assert!(doc.updated_at.is_none());
    }

    #[test]
    fn document_without_creator_is_owned_by_nobody() {
        let doc = Document {
            id: None,
            name: "x".to_string(),
            status: DocumentStatus::Draft,
            file_url: String::new(),
            creator: None,
            created_at: None,
            updated_at: None,
        };
        assert!(!doc.owned_by(&user("u-1")));
        assert!(doc.require_id().is_err());
    }

    #[test]
    fn default_name_strips_last_extension() {
        let name = |f: &str| FileUpload::new(f, vec![1]).default_name().to_string();
        assert_eq!(name("Invoice.pdf"), "Invoice");
        assert_eq!(name("archive.tar.gz"), "archive.tar");
        assert_eq!(name("README"), "README");
        assert_eq!(name(".hidden"), ".hidden");
    }

    #[test]
    fn new_document_requires_name_and_content() {
        let file = FileUpload::new("Invoice.pdf", b"%PDF".to_vec());
        assert_eq!(file.content_type, "application/pdf");
        assert_eq!(NewDocument::from_file(file.clone()).unwrap().name, "Invoice");
        assert!(NewDocument::new("  ", file).is_err());
        assert!(NewDocument::new("x", FileUpload::new("x.pdf", Vec::new())).is_err());
    }
}
