#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use docflow_auth::storage::{TOKEN_KEY, USER_KEY};
use docflow_auth::{
    AuthApi, Credentials, LoginResponse, MemoryStorage, RegisterUser, Role, SessionStorage,
    SessionStore, User,
};
use docflow_core::{ApiError, ApiResult, DocumentId, ListResponse, UserId};
use docflow_documents::{
    Confirm, ConfirmationPrompt, Document, DocumentApi, DocumentListRequest, DocumentPatch,
    DocumentStatus, NewDocument, NotificationKind, Notifier, PdfRenderer, RenderError,
    RenderHandle, WorkflowEngine,
};
use docflow_documents::query::CreatorFilter;

pub fn submitter(id: &str) -> User {
    User {
        id: UserId::new(id),
        email: format!("{id}@corp.io"),
        full_name: format!("Submitter {id}"),
        role: Role::Submitter,
    }
}

pub fn reviewer(id: &str) -> User {
    User {
        id: UserId::new(id),
        email: format!("{id}@corp.io"),
        full_name: format!("Reviewer {id}"),
        role: Role::Reviewer,
    }
}

/// In-memory server with the same transition rules as the real one.
#[derive(Default)]
pub struct FakeServer {
    docs: Mutex<Vec<Document>>,
    uploader: Mutex<Option<User>>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<String>>,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed(&self, doc: Document) -> DocumentId {
        let mut doc = doc;
        let id = doc
            .id
            .clone()
            .unwrap_or_else(|| DocumentId::new(uuid::Uuid::now_v7().to_string()));
        doc.id = Some(id.clone());
        self.docs.lock().unwrap().push(doc);
        id
    }

    pub fn seed_owned(&self, name: &str, status: DocumentStatus, owner: &User) -> DocumentId {
        self.seed(Document {
            id: None,
            name: name.to_string(),
            status,
            file_url: format!("https://files.test/{name}.pdf"),
            creator: Some(owner.clone()),
            created_at: Some(Utc::now()),
            updated_at: None,
        })
    }

    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn heal(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutation_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c != "list" && c != "get")
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn docs(&self) -> Vec<Document> {
        self.docs.lock().unwrap().clone()
    }

    pub fn status_of(&self, id: &DocumentId) -> Option<DocumentStatus> {
        self.docs
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id.as_ref() == Some(id))
            .map(|d| d.status)
    }

    pub fn count_with(&self, status: DocumentStatus) -> usize {
        self.docs().iter().filter(|d| d.status == status).count()
    }

    fn enter(&self, op: &'static str) -> ApiResult<()> {
        self.calls.lock().unwrap().push(op.to_string());
        if self.failing.lock().unwrap().contains(op) {
            return Err(ApiError::Network(format!("{op} unavailable")));
        }
        Ok(())
    }

    fn with_doc<T>(
        &self,
        id: &DocumentId,
        f: impl FnOnce(&mut Document) -> ApiResult<T>,
    ) -> ApiResult<T> {
        let mut docs = self.docs.lock().unwrap();
        let doc = docs
            .iter_mut()
            .find(|d| d.id.as_ref() == Some(id))
            .ok_or(ApiError::NotFound)?;
        f(doc)
    }

    fn move_status(
        &self,
        id: &DocumentId,
        from: DocumentStatus,
        to: DocumentStatus,
    ) -> ApiResult<Document> {
        self.with_doc(id, |doc| {
            if doc.status != from {
                return Err(ApiError::Conflict(format!(
                    "document is {}, expected {from}",
                    doc.status
                )));
            }
            doc.status = to;
            doc.updated_at = Some(Utc::now());
            Ok(doc.clone())
        })
    }
}

#[async_trait]
impl DocumentApi for FakeServer {
    async fn list(&self, request: &DocumentListRequest) -> ApiResult<ListResponse<Document>> {
        self.enter("list")?;
        let docs = self.docs.lock().unwrap();
        let matching: Vec<Document> = docs
            .iter()
            .filter(|d| request.status.is_none_or(|s| d.status == s))
            .filter(|d| match &request.creator {
                None => true,
                Some(CreatorFilter::Id(id)) => d.creator.as_ref().is_some_and(|c| &c.id == id),
                Some(CreatorFilter::Email(email)) => {
                    d.creator.as_ref().is_some_and(|c| &c.email == email)
                }
            })
            .cloned()
            .collect();

        let size = request.page.size as usize;
        let skip = (request.page.page as usize - 1) * size;
        Ok(ListResponse {
            count: matching.len() as u64,
            results: matching.into_iter().skip(skip).take(size).collect(),
        })
    }

    async fn get(&self, id: &DocumentId) -> ApiResult<Document> {
        self.enter("get")?;
        self.with_doc(id, |doc| Ok(doc.clone()))
    }

    async fn create(&self, document: &NewDocument, status: DocumentStatus) -> ApiResult<Document> {
        self.enter("create")?;
        let creator = self.uploader.lock().unwrap().clone();
        let doc = Document {
            id: Some(DocumentId::new(uuid::Uuid::now_v7().to_string())),
            name: document.name.clone(),
            status,
            file_url: format!("https://files.test/{}", document.file.file_name),
            creator,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        self.docs.lock().unwrap().push(doc.clone());
        Ok(doc)
    }

    async fn update(&self, id: &DocumentId, patch: &DocumentPatch) -> ApiResult<Document> {
        self.enter("update")?;
        self.with_doc(id, |doc| {
            if let Some(name) = &patch.name {
                doc.name = name.clone();
            }
            Ok(doc.clone())
        })
    }

    async fn send_to_review(&self, id: &DocumentId) -> ApiResult<Document> {
        self.enter("send_to_review")?;
        self.move_status(id, DocumentStatus::Draft, DocumentStatus::ReadyForReview)
    }

    async fn revoke_review(&self, id: &DocumentId) -> ApiResult<Document> {
        self.enter("revoke_review")?;
        self.move_status(id, DocumentStatus::ReadyForReview, DocumentStatus::Revoked)
    }

    async fn change_status(&self, id: &DocumentId, status: DocumentStatus) -> ApiResult<Document> {
        self.enter("change_status")?;
        let from = match status {
            DocumentStatus::UnderReview => DocumentStatus::ReadyForReview,
            DocumentStatus::Approved | DocumentStatus::Declined => DocumentStatus::UnderReview,
            other => return Err(ApiError::Api(400, format!("cannot set {other}"))),
        };
        self.move_status(id, from, status)
    }

    async fn delete(&self, id: &DocumentId) -> ApiResult<()> {
        self.enter("delete")?;
        let mut docs = self.docs.lock().unwrap();
        let before = docs.len();
        docs.retain(|d| d.id.as_ref() != Some(id));
        if docs.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}

/// Auth port that is never reached: sessions are restored from storage.
pub struct NoAuth;

#[async_trait]
impl AuthApi for NoAuth {
    async fn login(&self, _credentials: &Credentials) -> ApiResult<LoginResponse> {
        Err(ApiError::Unauthorized)
    }

    async fn current_user(&self) -> ApiResult<User> {
        Err(ApiError::Unauthorized)
    }

    async fn register(&self, _request: &RegisterUser) -> ApiResult<User> {
        Err(ApiError::Forbidden)
    }
}

pub fn session_for(user: Option<&User>) -> Arc<SessionStore> {
    let storage = Arc::new(MemoryStorage::new());
    if let Some(user) = user {
        storage.set(TOKEN_KEY, "tok").unwrap();
        storage
            .set(USER_KEY, &serde_json::to_string(user).unwrap())
            .unwrap();
    }
    let store = SessionStore::new(Arc::new(NoAuth), storage);
    store.restore();
    Arc::new(store)
}

/// Answers confirmations from a script; defaults to `true` when it runs out.
#[derive(Default)]
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    prompts: Mutex<Vec<ConfirmationPrompt>>,
}

impl ScriptedConfirm {
    pub fn answering(answers: &[bool]) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            prompts: Mutex::default(),
        })
    }

    pub fn prompts(&self) -> Vec<ConfirmationPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirm for ScriptedConfirm {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.answers.lock().unwrap().pop_front().unwrap_or(true)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<(NotificationKind, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seen(&self) -> Vec<(NotificationKind, String)> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<(NotificationKind, String)> {
        self.seen.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.seen.lock().unwrap().push((kind, message.to_string()));
    }
}

#[derive(Default)]
pub struct FakeRenderer {
    next: AtomicU64,
    loaded: Mutex<Vec<RenderHandle>>,
    unloaded: Mutex<Vec<RenderHandle>>,
    pub fail: Mutex<bool>,
}

impl FakeRenderer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn loaded(&self) -> Vec<RenderHandle> {
        self.loaded.lock().unwrap().clone()
    }

    pub fn unloaded(&self) -> Vec<RenderHandle> {
        self.unloaded.lock().unwrap().clone()
    }
}

#[async_trait]
impl PdfRenderer for FakeRenderer {
    async fn load(&self, _container: &str, url: &str) -> Result<RenderHandle, RenderError> {
        if *self.fail.lock().unwrap() {
            return Err(RenderError(format!("cannot open {url}")));
        }
        let handle = RenderHandle(self.next.fetch_add(1, Ordering::SeqCst) + 1);
        self.loaded.lock().unwrap().push(handle);
        Ok(handle)
    }

    fn unload(&self, handle: RenderHandle) {
        self.unloaded.lock().unwrap().push(handle);
    }
}

pub struct Harness {
    pub server: Arc<FakeServer>,
    pub confirm: Arc<ScriptedConfirm>,
    pub notifier: Arc<RecordingNotifier>,
    pub engine: Arc<WorkflowEngine>,
}

impl Harness {
    pub fn new(server: &Arc<FakeServer>, user: Option<&User>, answers: &[bool]) -> Self {
        if let Some(u) = user.filter(|u| u.role == Role::Submitter) {
            *server.uploader.lock().unwrap() = Some(u.clone());
        }
        let confirm = ScriptedConfirm::answering(answers);
        let notifier = RecordingNotifier::new();
        let engine = Arc::new(WorkflowEngine::new(
            server.clone(),
            session_for(user),
            confirm.clone(),
            notifier.clone(),
        ));
        Self {
            server: server.clone(),
            confirm,
            notifier,
            engine,
        }
    }
}
