//! Session value and the Session Store ("who am I").
//!
//! # Invariants
//! - A token and a user profile are held together or not at all.
//! - Persisted copies are written and discarded with the in-memory state.
//! - `logout()` never fails.

use std::sync::Arc;

use thiserror::Error;

use docflow_core::store::Receiver;
use docflow_core::{ApiError, DomainError, Store};

use crate::api::{AuthApi, Credentials};
use crate::storage::{SessionStorage, StorageError, TOKEN_KEY, USER_KEY};
use crate::user::{RegisterUser, User};
use crate::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Authenticated {
    token: String,
    user: User,
}

/// Current authentication state.
///
/// The only way to hold a token is together with a user, so a half-populated
/// session cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    auth: Option<Authenticated>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { auth: None }
    }

    pub fn authenticated(token: impl Into<String>, user: User) -> Self {
        Self {
            auth: Some(Authenticated {
                token: token.into(),
                user,
            }),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.auth.as_ref().map(|a| &a.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.token.as_str())
    }

    pub fn role(&self) -> Option<Role> {
        self.current_user().map(|u| u.role)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Deliberately generic: never reveals whether the account exists.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Validation(#[from] DomainError),

    /// The token was issued and stored, but the profile fetch failed. The
    /// session stays unauthenticated until a later login succeeds.
    #[error("signed in, but the user profile could not be loaded: {0}")]
    ProfileUnavailable(ApiError),

    #[error("remote call failed: {0}")]
    Api(ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Reactive holder of the current [`Session`], backed by persisted storage.
pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn SessionStorage>,
    state: Store<Session>,
}

impl SessionStore {
    /// Create an anonymous store. Call [`SessionStore::restore`] at startup to
    /// pick up a persisted session.
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            api,
            storage,
            state: Store::new(Session::anonymous()),
        }
    }

    pub fn session(&self) -> Session {
        self.state.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.with(Session::is_authenticated)
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.with(|s| s.current_user().cloned())
    }

    pub fn subscribe(&self) -> Receiver<Session> {
        self.state.subscribe()
    }

    /// Restore a persisted session without re-validating the token.
    ///
    /// Both the token and a parseable profile must be present; anything else
    /// (unreadable storage, malformed profile, a lone token or profile) ends
    /// in a clean logout.
    pub fn restore(&self) -> Session {
        let token = self.storage.get(TOKEN_KEY);
        let user = self.storage.get(USER_KEY);

        match (token, user) {
            (Ok(None), Ok(None)) => {
                tracing::debug!("no persisted session");
                self.state.set(Session::anonymous());
            }
            (Ok(Some(token)), Ok(Some(user_json))) => {
                match serde_json::from_str::<User>(&user_json) {
                    Ok(user) => {
                        tracing::info!(user_id = %user.id, role = %user.role, "restored persisted session");
                        self.state.set(Session::authenticated(token, user));
                    }
                    Err(err) => {
                        tracing::warn!("persisted user profile is malformed, logging out: {err}");
                        self.logout();
                    }
                }
            }
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!("persisted session unreadable, logging out: {err}");
                self.logout();
            }
            _ => {
                tracing::warn!("persisted session is incomplete, logging out");
                self.logout();
            }
        }

        self.session()
    }

    /// Exchange credentials for a token, then load the profile.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::validation("email and password are required").into());
        }

        let credentials = Credentials::new(email, password);
        let response = self.api.login(&credentials).await.map_err(|err| match err {
            ApiError::Unauthorized
            | ApiError::Forbidden
            | ApiError::NotFound
            | ApiError::Api(400, _) => {
                tracing::warn!("login rejected");
                SessionError::InvalidCredentials
            }
            other => {
                tracing::error!("login request failed: {other}");
                SessionError::Api(other)
            }
        })?;

        // A new token never sits next to the previous user's profile.
        self.logout();
        self.storage.set(TOKEN_KEY, &response.access_token)?;

        let user = match self.api.current_user().await {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!("token stored but profile fetch failed: {err}");
                return Err(SessionError::ProfileUnavailable(err));
            }
        };

        let user_json =
            serde_json::to_string(&user).map_err(|e| StorageError::Io(e.to_string()))?;
        self.storage.set(USER_KEY, &user_json)?;

        tracing::info!(user_id = %user.id, role = %user.role, "logged in");
        let session = Session::authenticated(response.access_token, user);
        self.state.set(session.clone());
        Ok(session)
    }

    /// Register a new account. Does not log in.
    pub async fn register(&self, request: RegisterUser) -> Result<User, SessionError> {
        let request = request.validated()?;
        let user = self.api.register(&request).await.map_err(|err| {
            tracing::error!("registration failed: {err}");
            SessionError::Api(err)
        })?;
        tracing::info!(user_id = %user.id, role = %user.role, "registered user");
        Ok(user)
    }

    /// Clear in-memory and persisted state. Idempotent.
    pub fn logout(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.storage.remove(key) {
                tracing::error!("failed to clear persisted '{key}': {err}");
            }
        }
        let previous = self.state.set(Session::anonymous());
        if let Some(user) = previous.current_user() {
            tracing::info!(user_id = %user.id, "logged out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docflow_core::UserId;

    fn reviewer() -> User {
        User {
            id: UserId::new("r-1"),
            email: "rita@example.com".to_string(),
            full_name: "Rita Reviewer".to_string(),
            role: Role::Reviewer,
        }
    }

    #[test]
    fn anonymous_session_has_neither_token_nor_user() {
        let session = Session::anonymous();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
        assert!(session.current_user().is_none());
        assert!(session.role().is_none());
    }

    #[test]
    fn authenticated_session_carries_both() {
        let session = Session::authenticated("t-1", reviewer());
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("t-1"));
        assert_eq!(session.role(), Some(Role::Reviewer));
    }

    #[test]
    fn invalid_credentials_message_is_generic() {
        let msg = SessionError::InvalidCredentials.to_string();
        assert_eq!(msg, "invalid email or password");
    }
}
