//! reqwest adapter implementing every remote port.
//!
//! The bearer token is read from session storage on each request, so a login
//! or logout elsewhere in the process takes effect on the next call.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;

use docflow_auth::storage::TOKEN_KEY;
use docflow_auth::{
    AuthApi, Credentials, LoginResponse, RegisterUser, SessionStorage, User, UserApi,
    UserListRequest,
};
use docflow_core::{ApiError, ApiResult, DocumentId, ListResponse};
use docflow_documents::{
    Document, DocumentApi, DocumentListRequest, DocumentPatch, DocumentStatus, NewDocument,
};

use crate::config::ClientConfig;

pub struct HttpApi {
    client: Client,
    base_url: String,
    storage: Arc<dyn SessionStorage>,
}

impl HttpApi {
    pub fn new(config: &ClientConfig, storage: Arc<dyn SessionStorage>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            storage,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn document_url(&self, id: &DocumentId, suffix: &str) -> String {
        self.url(&format!("/document/{id}{suffix}"))
    }

    /// Attach the persisted bearer token, if any.
    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match self.storage.get(TOKEN_KEY) {
            Ok(Some(token)) => req.bearer_auth(token),
            Ok(None) => req,
            Err(err) => {
                tracing::warn!("could not read auth token, sending request without it: {err}");
                req
            }
        }
    }

    async fn dispatch(&self, req: RequestBuilder) -> ApiResult<reqwest::Response> {
        let resp = self.authorized(req).send().await.map_err(|e| {
            if e.is_connect() {
                ApiError::Network(format!("cannot connect to {}", self.base_url))
            } else if e.is_timeout() {
                ApiError::Network("request timed out".to_string())
            } else {
                ApiError::Network(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "request failed: {body}");
            return Err(ApiError::from_status(status.as_u16(), body));
        }
        Ok(resp)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<T> {
        self.dispatch(req)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_empty(&self, req: RequestBuilder) -> ApiResult<()> {
        self.dispatch(req).await.map(|_| ())
    }
}

#[async_trait]
impl AuthApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        self.send(self.client.post(self.url("/auth/login")).json(credentials))
            .await
    }

    async fn current_user(&self) -> ApiResult<User> {
        self.send(self.client.get(self.url("/user"))).await
    }

    async fn register(&self, request: &RegisterUser) -> ApiResult<User> {
        self.send(self.client.post(self.url("/user/register")).json(request))
            .await
    }
}

#[async_trait]
impl UserApi for HttpApi {
    async fn list_users(&self, request: &UserListRequest) -> ApiResult<ListResponse<User>> {
        self.send(
            self.client
                .get(self.url("/user/users"))
                .query(&request.query_pairs()),
        )
        .await
    }
}

#[async_trait]
impl DocumentApi for HttpApi {
    async fn list(&self, request: &DocumentListRequest) -> ApiResult<ListResponse<Document>> {
        self.send(
            self.client
                .get(self.url("/document"))
                .query(&request.query_pairs()),
        )
        .await
    }

    async fn get(&self, id: &DocumentId) -> ApiResult<Document> {
        self.send(self.client.get(self.document_url(id, ""))).await
    }

    async fn create(&self, document: &NewDocument, status: DocumentStatus) -> ApiResult<Document> {
        let file = Part::bytes(document.file.bytes.clone())
            .file_name(document.file.file_name.clone())
            .mime_str(&document.file.content_type)
            .map_err(|e| ApiError::Decode(format!("invalid content type: {e}")))?;
        let form = Form::new()
            .text("name", document.name.clone())
            .text("status", status.as_str())
            .part("file", file);

        self.send(self.client.post(self.url("/document")).multipart(form))
            .await
    }

    async fn update(&self, id: &DocumentId, patch: &DocumentPatch) -> ApiResult<Document> {
        self.send(self.client.patch(self.document_url(id, "")).json(patch))
            .await
    }

    async fn send_to_review(&self, id: &DocumentId) -> ApiResult<Document> {
        self.send(
            self.client
                .post(self.document_url(id, "/send-to-review"))
                .json(&json!({})),
        )
        .await
    }

    async fn revoke_review(&self, id: &DocumentId) -> ApiResult<Document> {
        self.send(
            self.client
                .post(self.document_url(id, "/revoke-review"))
                .json(&json!({})),
        )
        .await
    }

    async fn change_status(&self, id: &DocumentId, status: DocumentStatus) -> ApiResult<Document> {
        self.send(
            self.client
                .post(self.document_url(id, "/change-status"))
                .json(&json!({ "status": status })),
        )
        .await
    }

    async fn delete(&self, id: &DocumentId) -> ApiResult<()> {
        self.send_empty(self.client.delete(self.document_url(id, "")))
            .await
    }
}
