//! Outbound ports for authentication and the user directory.
//!
//! Implemented by the HTTP adapter in `docflow-client` and by in-memory fakes
//! in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use docflow_core::{ApiResult, ListResponse, PageRequest, SortKey};

use crate::user::{RegisterUser, User};

/// Login payload for `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

/// Query for `GET /user/users`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserListRequest {
    pub page: PageRequest,
    pub sort: Option<SortKey>,
}

impl UserListRequest {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.page.to_string()),
            ("size", self.page.size.to_string()),
        ];
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.to_string()));
        }
        pairs
    }
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for an access token.
    async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse>;

    /// Profile of the user owning the current token.
    async fn current_user(&self) -> ApiResult<User>;

    async fn register(&self, request: &RegisterUser) -> ApiResult<User>;
}

#[async_trait]
pub trait UserApi: Send + Sync {
    async fn list_users(&self, request: &UserListRequest) -> ApiResult<ListResponse<User>>;
}
