//! `docflow-auth` — who the client is acting as, and where it may navigate.
//!
//! This crate is intentionally decoupled from HTTP: remote calls go through
//! the [`api`] ports and persistence through [`storage::SessionStorage`].

pub mod api;
pub mod directory;
pub mod guard;
pub mod roles;
pub mod session;
pub mod storage;
pub mod user;

pub use api::{AuthApi, Credentials, LoginResponse, UserApi, UserListRequest};
pub use directory::UserDirectory;
pub use guard::{Destination, Guard, GuardOutcome, Route};
pub use roles::Role;
pub use session::{Session, SessionError, SessionStore};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use user::{RegisterUser, User};
