//! User Directory Lookup: read-only, paginated list of registered users.
//!
//! Only reviewers use it (creator-filter autocomplete); that restriction is
//! enforced by the feature consuming it, not here. Text search runs on the
//! client over the last fetched page only.

use std::sync::Arc;

use docflow_core::store::Receiver;
use docflow_core::{ApiError, ListResponse, Store};

use crate::api::{UserApi, UserListRequest};
use crate::user::User;

/// Last fetched page of users.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserPage {
    pub request: UserListRequest,
    pub users: Vec<User>,
    pub total_count: u64,
}

pub struct UserDirectory {
    api: Arc<dyn UserApi>,
    page: Store<UserPage>,
}

impl UserDirectory {
    pub fn new(api: Arc<dyn UserApi>) -> Self {
        Self {
            api,
            page: Store::default(),
        }
    }

    /// Fetch a page and replace the held page. On failure the held page is
    /// left untouched.
    pub async fn fetch(&self, request: UserListRequest) -> Result<UserPage, ApiError> {
        let ListResponse { results, count } =
            self.api.list_users(&request).await.inspect_err(|err| {
                tracing::error!("failed to load users: {err}");
            })?;

        tracing::debug!(
            page = request.page.page,
            size = request.page.size,
            fetched = results.len(),
            total = count,
            "user page replaced"
        );

        let page = UserPage {
            request,
            users: results,
            total_count: count,
        };
        self.page.set(page.clone());
        Ok(page)
    }

    pub fn page(&self) -> UserPage {
        self.page.get()
    }

    pub fn subscribe(&self) -> Receiver<UserPage> {
        self.page.subscribe()
    }

    /// Case-insensitive substring match on email or full name, over the last
    /// fetched page.
    pub fn filter(&self, query: &str) -> Vec<User> {
        self.page.with(|page| {
            page.users
                .iter()
                .filter(|u| u.matches(query))
                .cloned()
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use docflow_core::{ApiResult, PageRequest, UserId};

    use super::*;
    use crate::Role;

    struct FakeUsers {
        responses: Mutex<Vec<ApiResult<ListResponse<User>>>>,
    }

    #[async_trait]
    impl UserApi for FakeUsers {
        async fn list_users(&self, _request: &UserListRequest) -> ApiResult<ListResponse<User>> {
            self.responses.lock().unwrap().remove(0)
        }
    }

    fn user(id: &str, email: &str, name: &str) -> User {
        User {
            id: UserId::new(id),
            email: email.to_string(),
            full_name: name.to_string(),
            role: Role::Submitter,
        }
    }

    fn directory(responses: Vec<ApiResult<ListResponse<User>>>) -> UserDirectory {
        UserDirectory::new(Arc::new(FakeUsers {
            responses: Mutex::new(responses),
        }))
    }

    #[tokio::test]
    async fn filter_applies_to_last_page_only() {
        let dir = directory(vec![
            Ok(ListResponse {
                results: vec![
                    user("1", "alice@corp.io", "Alice Moss"),
                    user("2", "bob@corp.io", "Bob Stone"),
                ],
                count: 30,
            }),
            Ok(ListResponse {
                results: vec![user("3", "carol@corp.io", "Carol Moss")],
                count: 30,
            }),
        ]);

        dir.fetch(UserListRequest::default()).await.unwrap();
        let hits: Vec<_> = dir.filter("moss").into_iter().map(|u| u.id).collect();
        assert_eq!(hits, vec![UserId::new("1")]);

        let second = UserListRequest {
            page: PageRequest::new(2, 10).unwrap(),
            sort: None,
        };
        dir.fetch(second).await.unwrap();
        let hits: Vec<_> = dir.filter("MOSS").into_iter().map(|u| u.id).collect();
        assert_eq!(hits, vec![UserId::new("3")]);
        assert_eq!(dir.page().total_count, 30);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_page() {
        let dir = directory(vec![
            Ok(ListResponse {
                results: vec![user("1", "alice@corp.io", "Alice")],
                count: 1,
            }),
            Err(ApiError::Network("down".to_string())),
        ]);

        dir.fetch(UserListRequest::default()).await.unwrap();
        let mut rx = dir.subscribe();

        assert!(dir.fetch(UserListRequest::default()).await.is_err());
        assert!(!rx.has_changed().unwrap());
        assert_eq!(dir.page().users.len(), 1);
    }
}
