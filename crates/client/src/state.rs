//! Application state shared by every command.

use std::sync::Arc;

use docflow_auth::{FileStorage, SessionStorage, SessionStore, StorageError, UserDirectory};
use docflow_core::ApiError;
use docflow_documents::{Confirm, Notifier, WorkflowEngine};

use crate::config::ClientConfig;
use crate::http::HttpApi;

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Wiring of the session store, directory and workflow engine over one HTTP
/// adapter.
#[derive(Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub storage: Arc<dyn SessionStorage>,
    pub api: Arc<HttpApi>,
    pub session: Arc<SessionStore>,
    pub directory: Arc<UserDirectory>,
    pub engine: Arc<WorkflowEngine>,
}

impl AppState {
    /// Build state over file storage in the configured (or default) session
    /// directory.
    pub fn new(
        config: ClientConfig,
        confirm: Arc<dyn Confirm>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, InitError> {
        let storage: Arc<dyn SessionStorage> = match &config.session_dir {
            Some(dir) => Arc::new(FileStorage::new(dir)),
            None => Arc::new(FileStorage::in_default_dir()?),
        };
        Self::with_storage(config, storage, confirm, notifier)
    }

    /// Build state over the given storage and restore any persisted session.
    pub fn with_storage(
        config: ClientConfig,
        storage: Arc<dyn SessionStorage>,
        confirm: Arc<dyn Confirm>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, InitError> {
        let api = Arc::new(HttpApi::new(&config, storage.clone())?);
        let session = Arc::new(SessionStore::new(api.clone(), storage.clone()));
        session.restore();

        let directory = Arc::new(UserDirectory::new(api.clone()));
        let engine = Arc::new(WorkflowEngine::new(
            api.clone(),
            session.clone(),
            confirm,
            notifier,
        ));

        tracing::debug!(api_url = %config.api_url, authenticated = session.is_authenticated(), "client state initialized");

        Ok(Self {
            config,
            storage,
            api,
            session,
            directory,
            engine,
        })
    }

    pub fn logout(&self) {
        self.session.logout();
        self.engine.reset();
    }
}
