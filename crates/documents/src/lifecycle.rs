//! Document status state machine.
//!
//! Every legal status change is one row of [`RULES`]. Anything not listed is
//! refused locally before a remote call is made.

use docflow_auth::{Role, User};

use crate::document::{Document, DocumentStatus};

/// Statuses in which the owning submitter may rename a document.
pub const EDITABLE: [DocumentStatus; 3] = [
    DocumentStatus::Draft,
    DocumentStatus::Revoked,
    DocumentStatus::Declined,
];

/// Statuses in which the owning submitter may delete a document.
pub const DELETABLE: [DocumentStatus; 2] = [DocumentStatus::Draft, DocumentStatus::Revoked];

/// Who may trigger a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// A submitter who created the document.
    OwningSubmitter,
    /// Any reviewer.
    Reviewer,
}

impl Actor {
    pub fn admits(&self, document: &Document, user: &User) -> bool {
        match self {
            Actor::OwningSubmitter => user.role == Role::Submitter && document.owned_by(user),
            Actor::Reviewer => user.role == Role::Reviewer,
        }
    }
}

/// Remote operation that performs a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `POST /document/{id}/send-to-review`
    SendToReview,
    /// `POST /document/{id}/revoke-review`
    RevokeReview,
    /// `POST /document/{id}/change-status`
    ChangeStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub from: DocumentStatus,
    pub to: DocumentStatus,
    pub actor: Actor,
    pub requires_confirmation: bool,
    pub endpoint: Endpoint,
}

impl TransitionRule {
    pub fn success_message(&self) -> String {
        match self.endpoint {
            Endpoint::SendToReview => "Document submitted for review".to_string(),
            Endpoint::RevokeReview => "Document revoked successfully".to_string(),
            Endpoint::ChangeStatus => {
                format!("Document status set to {}", self.to.label().to_lowercase())
            }
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self.endpoint {
            Endpoint::SendToReview => "Failed to submit document for review",
            Endpoint::RevokeReview => "Failed to revoke document",
            Endpoint::ChangeStatus => "Failed to update document status",
        }
    }
}

pub const RULES: [TransitionRule; 5] = [
    TransitionRule {
        from: DocumentStatus::Draft,
        to: DocumentStatus::ReadyForReview,
        actor: Actor::OwningSubmitter,
        requires_confirmation: true,
        endpoint: Endpoint::SendToReview,
    },
    TransitionRule {
        from: DocumentStatus::ReadyForReview,
        to: DocumentStatus::UnderReview,
        actor: Actor::Reviewer,
        requires_confirmation: false,
        endpoint: Endpoint::ChangeStatus,
    },
    TransitionRule {
        from: DocumentStatus::ReadyForReview,
        to: DocumentStatus::Revoked,
        actor: Actor::OwningSubmitter,
        requires_confirmation: true,
        endpoint: Endpoint::RevokeReview,
    },
    TransitionRule {
        from: DocumentStatus::UnderReview,
        to: DocumentStatus::Approved,
        actor: Actor::Reviewer,
        requires_confirmation: false,
        endpoint: Endpoint::ChangeStatus,
    },
    TransitionRule {
        from: DocumentStatus::UnderReview,
        to: DocumentStatus::Declined,
        actor: Actor::Reviewer,
        requires_confirmation: false,
        endpoint: Endpoint::ChangeStatus,
    },
];

/// Rule for `from -> to`, if the transition exists at all.
pub fn rule(from: DocumentStatus, to: DocumentStatus) -> Option<&'static TransitionRule> {
    RULES.iter().find(|r| r.from == from && r.to == to)
}

/// All rules leaving `from`.
pub fn rules_from(from: DocumentStatus) -> impl Iterator<Item = &'static TransitionRule> {
    RULES.iter().filter(move |r| r.from == from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_have_no_outgoing_rules() {
        for status in DocumentStatus::ALL {
            let dead_end = rules_from(status).next().is_none();
            assert_eq!(
                status.is_terminal(),
                dead_end && status != DocumentStatus::Revoked
            );
        }
    }

    #[test]
    fn revoked_can_only_be_edited_not_transitioned() {
        assert!(rules_from(DocumentStatus::Revoked).next().is_none());
        assert!(EDITABLE.contains(&DocumentStatus::Revoked));
    }

    #[test]
    fn confirmation_only_for_submitter_transitions() {
        for r in RULES {
            assert_eq!(r.requires_confirmation, r.actor == Actor::OwningSubmitter);
        }
    }

    #[test]
    fn skipping_review_is_not_a_transition() {
        assert!(rule(DocumentStatus::Draft, DocumentStatus::UnderReview).is_none());
        assert!(rule(DocumentStatus::ReadyForReview, DocumentStatus::Approved).is_none());
        assert!(rule(DocumentStatus::Draft, DocumentStatus::Draft).is_none());
    }

    #[test]
    fn success_messages() {
        let approve = rule(DocumentStatus::UnderReview, DocumentStatus::Approved).unwrap();
        assert_eq!(approve.success_message(), "Document status set to approved");
        let start = rule(DocumentStatus::ReadyForReview, DocumentStatus::UnderReview).unwrap();
        assert_eq!(start.success_message(), "Document status set to under review");
        let revoke = rule(DocumentStatus::ReadyForReview, DocumentStatus::Revoked).unwrap();
        assert_eq!(revoke.success_message(), "Document revoked successfully");
    }
}
