//! `docflow-core` — shared building blocks for the document workflow client.
//!
//! This crate contains **no IO**: identifiers, the domain error model, list
//! query primitives, the remote port error type, and the observable [`Store`].

pub mod error;
pub mod id;
pub mod query;
pub mod remote;
pub mod store;

pub use error::{DomainError, DomainResult};
pub use id::{DocumentId, UserId};
pub use query::{PageRequest, SortDirection, SortKey};
pub use remote::{ApiError, ApiResult, ListResponse};
pub use store::Store;
