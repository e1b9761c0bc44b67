//! Document detail view session.
//!
//! Owns one document, the renderer handle showing it, and the scope that ties
//! both to the view's lifetime. Closing (or dropping) the view cancels
//! in-flight work and unloads the renderer.

use std::sync::{Arc, Mutex};

use docflow_core::store::Receiver;
use docflow_core::{DocumentId, DomainError, Store};

use crate::document::{Document, DocumentStatus};
use crate::error::WorkflowError;
use crate::policy::{self, Capabilities};
use crate::ports::{PdfRenderer, RenderHandle};
use crate::scope::ViewScope;
use crate::workflow::{Outcome, WorkflowEngine};

pub struct DocumentView {
    engine: Arc<WorkflowEngine>,
    renderer: Arc<dyn PdfRenderer>,
    scope: ViewScope,
    document: Store<Option<Document>>,
    handle: Mutex<Option<RenderHandle>>,
}

impl DocumentView {
    pub fn new(engine: Arc<WorkflowEngine>, renderer: Arc<dyn PdfRenderer>) -> Self {
        Self {
            engine,
            renderer,
            scope: ViewScope::new(),
            document: Store::new(None),
            handle: Mutex::new(None),
        }
    }

    pub fn document(&self) -> Option<Document> {
        self.document.get()
    }

    pub fn subscribe(&self) -> Receiver<Option<Document>> {
        self.document.subscribe()
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    /// Capabilities of the current user on the held document, recomputed on
    /// every call.
    pub fn capabilities(&self) -> Capabilities {
        let user = self.engine.session().current_user();
        self.document
            .with(|doc| match doc {
                Some(doc) => Capabilities::evaluate(doc, user.as_ref()),
                None => Capabilities::default(),
            })
    }

    pub fn available_transitions(&self) -> Vec<DocumentStatus> {
        let user = self.engine.session().current_user();
        self.document.with(|doc| {
            doc.as_ref()
                .map(|d| policy::authorized_transitions(d, user.as_ref()).into_iter().collect())
                .unwrap_or_default()
        })
    }

    /// Fetch the document and render its file into `container`.
    ///
    /// A renderer failure leaves the document loaded; it is logged and
    /// returned as `Ok(false)`.
    pub async fn open(&self, id: &DocumentId, container: &str) -> Result<bool, WorkflowError> {
        let document = self
            .scope
            .run(self.engine.get(id))
            .await
            .ok_or(WorkflowError::Cancelled)??;

        let url = document.file_url.clone();
        self.document.set(Some(document));

        if url.is_empty() {
            tracing::debug!(document_id = %id, "document has no file to render");
            return Ok(false);
        }

        let Some(loaded) = self.scope.run(self.renderer.load(container, &url)).await else {
            return Err(WorkflowError::Cancelled);
        };
        match loaded {
            Ok(handle) => {
                if let Some(previous) = self.swap_handle(Some(handle)) {
                    self.renderer.unload(previous);
                }
                if self.scope.is_closed() {
                    self.unload();
                    return Err(WorkflowError::Cancelled);
                }
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(document_id = %id, "{err}");
                Ok(false)
            }
        }
    }

    /// Apply a transition to the held document and adopt the server's copy.
    pub async fn transition(&self, target: DocumentStatus) -> Result<Outcome<Document>, WorkflowError> {
        let document = self.current()?;
        let outcome = self
            .scope
            .run(self.engine.transition_document(&document, target))
            .await
            .ok_or(WorkflowError::Cancelled)??;

        if let Outcome::Applied(updated) = &outcome {
            self.document.set(Some(updated.clone()));
        }
        Ok(outcome)
    }

    pub async fn rename(&self, name: &str) -> Result<Document, WorkflowError> {
        let document = self.current()?;
        let updated = self
            .scope
            .run(self.engine.update_document(&document, name))
            .await
            .ok_or(WorkflowError::Cancelled)??;
        self.document.set(Some(updated.clone()));
        Ok(updated)
    }

    /// Delete the held document. On success the view is closed.
    pub async fn delete(&self) -> Result<Outcome<()>, WorkflowError> {
        let document = self.current()?;
        let outcome = self
            .scope
            .run(self.engine.delete_document(&document))
            .await
            .ok_or(WorkflowError::Cancelled)??;
        if matches!(outcome, Outcome::Applied(())) {
            self.document.set(None);
            self.close();
        }
        Ok(outcome)
    }

    /// Cancel in-flight work and release the renderer. Idempotent.
    pub fn close(&self) {
        self.scope.close();
        self.unload();
    }

    fn current(&self) -> Result<Document, WorkflowError> {
        if self.scope.is_closed() {
            return Err(WorkflowError::Cancelled);
        }
        self.document
            .get()
            .ok_or_else(|| DomainError::validation("no document loaded").into())
    }

    fn swap_handle(&self, next: Option<RenderHandle>) -> Option<RenderHandle> {
        match self.handle.lock() {
            Ok(mut guard) => std::mem::replace(&mut *guard, next),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), next),
        }
    }

    fn unload(&self) {
        if let Some(handle) = self.swap_handle(None) {
            tracing::debug!(handle = handle.0, "unloading rendered document");
            self.renderer.unload(handle);
        }
    }
}

impl Drop for DocumentView {
    fn drop(&mut self) {
        self.close();
    }
}
