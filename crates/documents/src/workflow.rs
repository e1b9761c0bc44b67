//! Document Workflow Engine.
//!
//! Every mutation follows the same path: resolve the current user, check the
//! capability locally, confirm when the rule asks for it, call the remote
//! port, notify, then re-list the active page. Failed calls never touch the
//! cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use docflow_auth::{Role, SessionStore, User};
use docflow_core::store::Receiver;
use docflow_core::{ApiError, DocumentId, DomainError, Store};

use crate::cache::{DocumentCache, DocumentPage};
use crate::document::{Document, DocumentStatus, NewDocument};
use crate::error::{Refusal, WorkflowError};
use crate::lifecycle::{Endpoint, TransitionRule};
use crate::policy;
use crate::ports::{
    Confirm, ConfirmationPrompt, DocumentApi, DocumentPatch, NotificationKind, Notifier,
};
use crate::query::DocumentListRequest;
use crate::scope::ViewScope;

const CONFLICT_MESSAGE: &str =
    "The document was changed by someone else. Refresh and try again.";

const SUBMIT_AFTER_CREATE_FAILED: &str =
    "Document saved as draft, but submitting it for review failed. Submit it again from the document list.";

/// Result of an action that may be declined at the confirmation step.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Applied(T),
    /// The user answered "no"; nothing was sent.
    Declined,
}

impl<T> Outcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(v) => Some(v),
            Outcome::Declined => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Draft(Document),
    Submitted(Document),
    /// Upload succeeded, the follow-up submit did not. The document stays a
    /// draft and is not rolled back.
    SubmitFailed { document: Document, error: ApiError },
}

impl CreateOutcome {
    pub fn document(&self) -> &Document {
        match self {
            CreateOutcome::Draft(d) | CreateOutcome::Submitted(d) => d,
            CreateOutcome::SubmitFailed { document, .. } => document,
        }
    }
}

pub struct WorkflowEngine {
    api: Arc<dyn DocumentApi>,
    session: Arc<SessionStore>,
    cache: DocumentCache,
    confirm: Arc<dyn Confirm>,
    notifier: Arc<dyn Notifier>,
    loading: Store<bool>,
    inflight: AtomicUsize,
}

/// Holds the loading flag up for as long as it lives.
struct Busy<'a> {
    inflight: &'a AtomicUsize,
    loading: &'a Store<bool>,
}

impl<'a> Busy<'a> {
    fn enter(inflight: &'a AtomicUsize, loading: &'a Store<bool>) -> Self {
        if inflight.fetch_add(1, Ordering::SeqCst) == 0 {
            loading.update_if(|v| !std::mem::replace(v, true));
        }
        Self { inflight, loading }
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        if self.inflight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.loading.update_if(|v| std::mem::replace(v, false));
        }
    }
}

impl WorkflowEngine {
    pub fn new(
        api: Arc<dyn DocumentApi>,
        session: Arc<SessionStore>,
        confirm: Arc<dyn Confirm>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            session,
            cache: DocumentCache::new(),
            confirm,
            notifier,
            loading: Store::new(false),
            inflight: AtomicUsize::new(0),
        }
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn subscribe_loading(&self) -> Receiver<bool> {
        self.loading.subscribe()
    }

    /// Drop cached documents, e.g. after logout.
    pub fn reset(&self) {
        self.cache.clear();
    }

    fn busy(&self) -> Busy<'_> {
        Busy::enter(&self.inflight, &self.loading)
    }

    fn require_user(&self) -> Result<User, WorkflowError> {
        self.session.current_user().ok_or_else(|| {
            tracing::warn!("document action attempted without a session");
            WorkflowError::NotAuthenticated
        })
    }

    fn refuse<T>(&self, refusal: Refusal) -> Result<T, WorkflowError> {
        tracing::warn!("refused locally: {refusal}");
        Err(WorkflowError::Refused(refusal))
    }

    fn report_failure(&self, context: &str, message: &str, err: &ApiError) {
        tracing::error!("{context}: {err}");
        let message = if err.is_conflict() {
            CONFLICT_MESSAGE
        } else {
            message
        };
        self.notifier.notify(NotificationKind::Error, message);
    }

    // ---- reads ----

    /// Fetch a page and replace the cache with it.
    pub async fn list(&self, request: DocumentListRequest) -> Result<DocumentPage, WorkflowError> {
        self.list_in(&ViewScope::new(), request).await
    }

    /// Like [`WorkflowEngine::list`], but the response is discarded when
    /// `scope` closes first.
    pub async fn list_in(
        &self,
        scope: &ViewScope,
        request: DocumentListRequest,
    ) -> Result<DocumentPage, WorkflowError> {
        let user = self.require_user()?;
        let request = request.scoped_for(&user);

        let _busy = self.busy();
        let response = scope
            .run(self.api.list(&request))
            .await
            .ok_or(WorkflowError::Cancelled)?;

        match response {
            Ok(response) => {
                self.cache.replace(request, response);
                Ok(self.cache.snapshot())
            }
            Err(err) => {
                self.report_failure("failed to load documents", "Failed to load documents", &err);
                Err(err.into())
            }
        }
    }

    /// Re-list with the active request.
    pub async fn refresh(&self) -> Result<DocumentPage, WorkflowError> {
        self.relist().await.map_err(|err| {
            if let WorkflowError::Api(api) = &err {
                self.report_failure("failed to reload documents", "Failed to load documents", api);
            }
            err
        })
    }

    async fn relist(&self) -> Result<DocumentPage, WorkflowError> {
        let user = self.require_user()?;
        let request = self.cache.active_request().scoped_for(&user);

        let _busy = self.busy();
        let response = self.api.list(&request).await?;
        self.cache.replace(request, response);
        Ok(self.cache.snapshot())
    }

    /// The mutation already succeeded and was reported; a failed re-list
    /// only leaves the previous page in place.
    async fn refresh_after_mutation(&self) {
        if let Err(err) = self.relist().await {
            tracing::warn!("mutation succeeded but the document list could not be refreshed: {err}");
        }
    }

    /// Single document by id. Does not touch the cache.
    pub async fn get(&self, id: &DocumentId) -> Result<Document, WorkflowError> {
        self.require_user()?;
        let fetched = {
            let _busy = self.busy();
            self.api.get(id).await
        };
        fetched.map_err(|err| {
            self.report_failure(
                &format!("failed to load document {id}"),
                "Failed to load document",
                &err,
            );
            match err {
                ApiError::NotFound => WorkflowError::NotFound(id.clone()),
                other => WorkflowError::Api(other),
            }
        })
    }

    /// The document as currently cached, or fetched when it is not on the
    /// held page.
    async fn resolve(&self, id: &DocumentId) -> Result<Document, WorkflowError> {
        match self.cache.find(id) {
            Some(doc) => Ok(doc),
            None => self.get(id).await,
        }
    }

    // ---- mutations ----

    /// Upload a new document as a draft, optionally submitting it for review
    /// right after.
    pub async fn create(
        &self,
        document: NewDocument,
        submit_for_review: bool,
    ) -> Result<CreateOutcome, WorkflowError> {
        let user = self.require_user()?;
        if user.role != Role::Submitter {
            return self.refuse(Refusal::CreateNotPermitted);
        }

        let created = {
            let _busy = self.busy();
            self.api.create(&document, DocumentStatus::Draft).await
        };
        let created = match created {
            Ok(doc) => doc,
            Err(err) => {
                self.report_failure("failed to create document", "Failed to create document", &err);
                return Err(err.into());
            }
        };
        tracing::info!(document_id = ?created.id, name = %created.name, "document created");

        let outcome = if !submit_for_review {
            self.notifier
                .notify(NotificationKind::Success, "Document saved as draft");
            CreateOutcome::Draft(created)
        } else {
            self.submit_created(created).await
        };

        self.refresh_after_mutation().await;
        Ok(outcome)
    }

    async fn submit_created(&self, created: Document) -> CreateOutcome {
        let id = match created.require_id() {
            Ok(id) => id.clone(),
            Err(err) => {
                tracing::warn!("created document has no id, cannot submit: {err}");
                self.notifier
                    .notify(NotificationKind::Error, SUBMIT_AFTER_CREATE_FAILED);
                return CreateOutcome::SubmitFailed {
                    document: created,
                    error: ApiError::Decode(err.to_string()),
                };
            }
        };

        let submitted = {
            let _busy = self.busy();
            self.api.send_to_review(&id).await
        };
        match submitted {
            Ok(doc) => {
                tracing::info!(document_id = %id, "document submitted for review");
                self.notifier
                    .notify(NotificationKind::Success, "Document submitted for review");
                CreateOutcome::Submitted(doc)
            }
            Err(error) => {
                tracing::warn!(document_id = %id, "document created but submit failed: {error}");
                self.notifier
                    .notify(NotificationKind::Error, SUBMIT_AFTER_CREATE_FAILED);
                CreateOutcome::SubmitFailed {
                    document: created,
                    error,
                }
            }
        }
    }

    /// Rename a document. Status is unchanged.
    pub async fn update_metadata(
        &self,
        id: &DocumentId,
        name: &str,
    ) -> Result<Document, WorkflowError> {
        let document = self.resolve(id).await?;
        self.update_document(&document, name).await
    }

    pub async fn update_document(
        &self,
        document: &Document,
        name: &str,
    ) -> Result<Document, WorkflowError> {
        let user = self.require_user()?;
        if !policy::can_edit(document, Some(&user)) {
            return self.refuse(Refusal::NotPermitted {
                action: "edit",
                status: document.status,
            });
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("document name is required").into());
        }
        let id = document.require_id()?;

        let updated = {
            let _busy = self.busy();
            self.api.update(id, &DocumentPatch::rename(name)).await
        };
        match updated {
            Ok(doc) => {
                tracing::info!(document_id = %id, "document renamed");
                self.notifier
                    .notify(NotificationKind::Success, "Document updated successfully");
                self.refresh_after_mutation().await;
                Ok(doc)
            }
            Err(err) => {
                self.report_failure("failed to update document", "Failed to update document", &err);
                Err(err.into())
            }
        }
    }

    /// Move a document to `target`, if the rule table and the current user
    /// allow it.
    pub async fn transition(
        &self,
        id: &DocumentId,
        target: DocumentStatus,
    ) -> Result<Outcome<Document>, WorkflowError> {
        let document = self.resolve(id).await?;
        self.transition_document(&document, target).await
    }

    pub async fn transition_document(
        &self,
        document: &Document,
        target: DocumentStatus,
    ) -> Result<Outcome<Document>, WorkflowError> {
        let user = self.require_user()?;
        let rule = match policy::authorize(document, &user, target) {
            Ok(rule) => rule,
            Err(refusal) => return self.refuse(refusal),
        };
        let id = document.require_id()?;

        if rule.requires_confirmation {
            let prompt = match rule.endpoint {
                Endpoint::RevokeReview => ConfirmationPrompt::revoke(&document.name),
                _ => ConfirmationPrompt::submit(&document.name),
            };
            if !self.confirm.confirm(&prompt).await {
                tracing::debug!(document_id = %id, to = %target, "transition declined at confirmation");
                return Ok(Outcome::Declined);
            }
        }

        let result = {
            let _busy = self.busy();
            self.execute(rule, id).await
        };
        match result {
            Ok(doc) => {
                tracing::info!(
                    document_id = %id,
                    from = %rule.from,
                    to = %rule.to,
                    user_id = %user.id,
                    "document status changed"
                );
                self.notifier
                    .notify(NotificationKind::Success, &rule.success_message());
                self.refresh_after_mutation().await;
                Ok(Outcome::Applied(doc))
            }
            Err(err) => {
                self.report_failure("status change failed", rule.failure_message(), &err);
                Err(err.into())
            }
        }
    }

    async fn execute(&self, rule: &TransitionRule, id: &DocumentId) -> Result<Document, ApiError> {
        match rule.endpoint {
            Endpoint::SendToReview => self.api.send_to_review(id).await,
            Endpoint::RevokeReview => self.api.revoke_review(id).await,
            Endpoint::ChangeStatus => self.api.change_status(id, rule.to).await,
        }
    }

    pub async fn submit_for_review(&self, id: &DocumentId) -> Result<Outcome<Document>, WorkflowError> {
        self.transition(id, DocumentStatus::ReadyForReview).await
    }

    pub async fn revoke(&self, id: &DocumentId) -> Result<Outcome<Document>, WorkflowError> {
        self.transition(id, DocumentStatus::Revoked).await
    }

    pub async fn start_review(&self, id: &DocumentId) -> Result<Outcome<Document>, WorkflowError> {
        self.transition(id, DocumentStatus::UnderReview).await
    }

    pub async fn approve(&self, id: &DocumentId) -> Result<Outcome<Document>, WorkflowError> {
        self.transition(id, DocumentStatus::Approved).await
    }

    pub async fn decline(&self, id: &DocumentId) -> Result<Outcome<Document>, WorkflowError> {
        self.transition(id, DocumentStatus::Declined).await
    }

    /// Delete after confirmation. The cache only changes through the re-list
    /// that follows a successful delete.
    pub async fn delete(&self, id: &DocumentId) -> Result<Outcome<()>, WorkflowError> {
        let document = self.resolve(id).await?;
        self.delete_document(&document).await
    }

    pub async fn delete_document(&self, document: &Document) -> Result<Outcome<()>, WorkflowError> {
        let user = self.require_user()?;
        if !policy::can_delete(document, Some(&user)) {
            return self.refuse(Refusal::NotPermitted {
                action: "delete",
                status: document.status,
            });
        }
        let id = document.require_id()?;

        if !self
            .confirm
            .confirm(&ConfirmationPrompt::delete(&document.name))
            .await
        {
            tracing::debug!(document_id = %id, "delete declined at confirmation");
            return Ok(Outcome::Declined);
        }

        let deleted = {
            let _busy = self.busy();
            self.api.delete(id).await
        };
        match deleted {
            Ok(()) => {
                tracing::info!(document_id = %id, user_id = %user.id, "document deleted");
                self.notifier
                    .notify(NotificationKind::Success, "Document deleted successfully");
                self.refresh_after_mutation().await;
                Ok(Outcome::Applied(()))
            }
            Err(err) => {
                self.report_failure("failed to delete document", "Failed to delete document", &err);
                Err(err.into())
            }
        }
    }
}
