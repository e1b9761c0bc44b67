use docflow_auth::{Role, User};
use docflow_core::{PageRequest, SortKey, UserId};

use crate::document::DocumentStatus;

/// Reviewer-side filter on who created a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatorFilter {
    Id(UserId),
    Email(String),
}

/// Query for `GET /document`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentListRequest {
    pub page: PageRequest,
    pub sort: Option<SortKey>,
    pub status: Option<DocumentStatus>,
    pub creator: Option<CreatorFilter>,
}

impl DocumentListRequest {
    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_creator(mut self, creator: CreatorFilter) -> Self {
        self.creator = Some(creator);
        self
    }

    /// Restrict the request to what `user` may ask for. Submitters cannot
    /// filter by creator; the server scopes their listings.
    pub fn scoped_for(mut self, user: &User) -> Self {
        if user.role == Role::Submitter && self.creator.take().is_some() {
            tracing::debug!(user_id = %user.id, "dropping creator filter for submitter listing");
        }
        self
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.page.to_string()),
            ("size", self.page.size.to_string()),
        ];
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        match &self.creator {
            Some(CreatorFilter::Id(id)) => pairs.push(("creatorId", id.to_string())),
            Some(CreatorFilter::Email(email)) => pairs.push(("creatorEmail", email.clone())),
            None => {}
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: UserId::new("u-1"),
            email: "u@corp.io".to_string(),
            full_name: "U".to_string(),
            role,
        }
    }

    #[test]
    fn query_pairs_carry_every_filter() {
        let req = DocumentListRequest::default()
            .with_page(PageRequest::new(3, 25).unwrap())
            .with_sort(SortKey::desc("updatedAt"))
            .with_status(DocumentStatus::UnderReview)
            .with_creator(CreatorFilter::Email("a@corp.io".to_string()));

        assert_eq!(
            req.query_pairs(),
            vec![
                ("page", "3".to_string()),
                ("size", "25".to_string()),
                ("sort", "updatedAt,desc".to_string()),
                ("status", "UNDER_REVIEW".to_string()),
                ("creatorEmail", "a@corp.io".to_string()),
            ]
        );
    }

    #[test]
    fn creator_filter_is_reviewer_only() {
        let req = DocumentListRequest::default()
            .with_status(DocumentStatus::Draft)
            .with_creator(CreatorFilter::Id(UserId::new("x")));

        let scoped = req.clone().scoped_for(&user(Role::Submitter));
        assert_eq!(scoped.creator, None);
        assert_eq!(scoped.status, Some(DocumentStatus::Draft));

        assert_eq!(req.clone().scoped_for(&user(Role::Reviewer)), req);
    }
}
