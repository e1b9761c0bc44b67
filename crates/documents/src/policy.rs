//! Capability policy: what the current user may do with a document.
//!
//! Everything here is a pure function of `(document.status, document.creator,
//! user)`. Results are recomputed on every call and never stored.

use std::collections::BTreeSet;

use docflow_auth::{Role, User};

use crate::document::{Document, DocumentStatus};
use crate::error::Refusal;
use crate::lifecycle::{self, TransitionRule, DELETABLE, EDITABLE};

fn is_owning_submitter(document: &Document, user: &User) -> bool {
    user.role == Role::Submitter && document.owned_by(user)
}

pub fn can_edit(document: &Document, user: Option<&User>) -> bool {
    user.is_some_and(|u| is_owning_submitter(document, u) && EDITABLE.contains(&document.status))
}

pub fn can_delete(document: &Document, user: Option<&User>) -> bool {
    user.is_some_and(|u| is_owning_submitter(document, u) && DELETABLE.contains(&document.status))
}

fn can_transition(document: &Document, user: Option<&User>, to: DocumentStatus) -> bool {
    match (user, lifecycle::rule(document.status, to)) {
        (Some(user), Some(rule)) => rule.actor.admits(document, user),
        _ => false,
    }
}

pub fn can_submit_for_review(document: &Document, user: Option<&User>) -> bool {
    can_transition(document, user, DocumentStatus::ReadyForReview)
}

pub fn can_revoke(document: &Document, user: Option<&User>) -> bool {
    can_transition(document, user, DocumentStatus::Revoked)
}

pub fn can_advance_to_under_review(document: &Document, user: Option<&User>) -> bool {
    can_transition(document, user, DocumentStatus::UnderReview)
}

pub fn can_approve(document: &Document, user: Option<&User>) -> bool {
    can_transition(document, user, DocumentStatus::Approved)
}

pub fn can_decline(document: &Document, user: Option<&User>) -> bool {
    can_transition(document, user, DocumentStatus::Declined)
}

/// Target statuses `user` may move `document` to right now.
pub fn authorized_transitions(document: &Document, user: Option<&User>) -> BTreeSet<DocumentStatus> {
    let Some(user) = user else {
        return BTreeSet::new();
    };
    lifecycle::rules_from(document.status)
        .filter(|rule| rule.actor.admits(document, user))
        .map(|rule| rule.to)
        .collect()
}

/// Check a transition and return the rule to execute.
pub fn authorize(
    document: &Document,
    user: &User,
    to: DocumentStatus,
) -> Result<&'static TransitionRule, Refusal> {
    let rule = lifecycle::rule(document.status, to).ok_or(Refusal::IllegalTransition {
        from: document.status,
        to,
    })?;
    if !rule.actor.admits(document, user) {
        return Err(Refusal::NotPermitted {
            action: action_name(to),
            status: document.status,
        });
    }
    Ok(rule)
}

fn action_name(to: DocumentStatus) -> &'static str {
    match to {
        DocumentStatus::ReadyForReview => "submit",
        DocumentStatus::Revoked => "revoke",
        DocumentStatus::UnderReview => "start review of",
        DocumentStatus::Approved => "approve",
        DocumentStatus::Declined => "decline",
        DocumentStatus::Draft => "reset",
    }
}

/// Snapshot of every capability for one `(document, user)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_submit_for_review: bool,
    pub can_revoke: bool,
    pub can_advance_to_under_review: bool,
    pub can_approve: bool,
    pub can_decline: bool,
}

impl Capabilities {
    pub fn evaluate(document: &Document, user: Option<&User>) -> Self {
        Self {
            can_edit: can_edit(document, user),
            can_delete: can_delete(document, user),
            can_submit_for_review: can_submit_for_review(document, user),
            can_revoke: can_revoke(document, user),
            can_advance_to_under_review: can_advance_to_under_review(document, user),
            can_approve: can_approve(document, user),
            can_decline: can_decline(document, user),
        }
    }

    pub fn any(&self) -> bool {
        *self != Self::default()
    }
}
