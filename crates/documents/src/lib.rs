//! `docflow-documents` — document lifecycle, capability policy and the
//! client-side workflow engine.
//!
//! The engine never talks HTTP directly: remote calls go through
//! [`ports::DocumentApi`], user interaction through [`ports::Confirm`] and
//! [`ports::Notifier`], and PDF display through [`ports::PdfRenderer`].

pub mod cache;
pub mod document;
pub mod error;
pub mod lifecycle;
pub mod policy;
pub mod ports;
pub mod query;
pub mod scope;
pub mod viewer;
pub mod workflow;

pub use cache::{DocumentCache, DocumentPage};
pub use document::{Document, DocumentStatus, FileUpload, NewDocument};
pub use error::{Refusal, WorkflowError};
pub use lifecycle::{Actor, Endpoint, TransitionRule};
pub use policy::{authorized_transitions, Capabilities};
pub use ports::{
    Confirm, ConfirmationPrompt, DocumentApi, DocumentPatch, NotificationKind, Notifier,
    PdfRenderer, RenderError, RenderHandle,
};
pub use query::{CreatorFilter, DocumentListRequest};
pub use scope::ViewScope;
pub use viewer::DocumentView;
pub use workflow::{CreateOutcome, Outcome, WorkflowEngine};
