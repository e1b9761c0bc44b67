//! `docflow-client`
//!
//! **Responsibility:** the outer shell around the document workflow.
//!
//! This crate provides:
//! - Environment configuration
//! - The reqwest adapter for every remote port
//! - Terminal confirmation and notification
//! - Application state wiring used by the `docflow` binary

pub mod collaborators;
pub mod config;
pub mod http;
pub mod state;

pub use collaborators::{AutoConfirm, ConsoleNotifier, LinkRenderer, TerminalConfirm};
pub use config::{ClientConfig, ConfigError};
pub use http::HttpApi;
pub use state::{AppState, InitError};
