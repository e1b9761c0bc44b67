//! Navigation guards.
//!
//! Guards are pure functions of an explicit [`Session`]: no IO, no panics, no
//! hidden lookups. A failed guard is never an error; it is a redirect.

use docflow_core::DocumentId;

use crate::session::Session;
use crate::Role;

/// Where a refused navigation is sent instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Login,
    /// Default landing page of the authenticated area.
    Landing,
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Destination::Login => "/auth/login",
            Destination::Landing => "/dashboard/documents",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Redirect(Destination),
}

impl GuardOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardOutcome::Allow)
    }
}

pub fn require_authenticated(session: &Session) -> GuardOutcome {
    if session.is_authenticated() {
        GuardOutcome::Allow
    } else {
        GuardOutcome::Redirect(Destination::Login)
    }
}

/// Keeps signed-in users away from login/registration.
pub fn require_unauthenticated(session: &Session) -> GuardOutcome {
    if session.is_authenticated() {
        GuardOutcome::Redirect(Destination::Landing)
    } else {
        GuardOutcome::Allow
    }
}

/// Wrong role is a soft redirect to the landing page, not an error.
///
/// `allowed` is read as a set: order and duplicates do not matter.
pub fn require_role(session: &Session, allowed: &[Role]) -> GuardOutcome {
    match session.role() {
        Some(role) if allowed.contains(&role) => GuardOutcome::Allow,
        Some(_) => GuardOutcome::Redirect(Destination::Landing),
        None => GuardOutcome::Redirect(Destination::Login),
    }
}

/// Composable guard, evaluated in order by [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    Authenticated,
    Unauthenticated,
    Role(Vec<Role>),
}

impl Guard {
    pub fn check(&self, session: &Session) -> GuardOutcome {
        match self {
            Guard::Authenticated => require_authenticated(session),
            Guard::Unauthenticated => require_unauthenticated(session),
            Guard::Role(allowed) => require_role(session, allowed),
        }
    }
}

/// First redirect wins; all guards passing allows the navigation.
pub fn evaluate(guards: &[Guard], session: &Session) -> GuardOutcome {
    guards
        .iter()
        .map(|g| g.check(session))
        .find(|outcome| !outcome.is_allowed())
        .unwrap_or(GuardOutcome::Allow)
}

/// Navigation surface of the application and the guards protecting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Documents,
    NewDocument,
    EditDocument(DocumentId),
    ViewDocument(DocumentId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/auth/login".to_string(),
            Route::Register => "/auth/register".to_string(),
            Route::Documents => "/dashboard/documents".to_string(),
            Route::NewDocument => "/dashboard/documents/new".to_string(),
            Route::EditDocument(id) => format!("/dashboard/documents/{id}/edit"),
            Route::ViewDocument(id) => format!("/dashboard/documents/{id}/view"),
        }
    }

    pub fn guards(&self) -> Vec<Guard> {
        match self {
            Route::Login | Route::Register => vec![Guard::Unauthenticated],
            Route::Documents | Route::ViewDocument(_) => vec![Guard::Authenticated],
            Route::NewDocument | Route::EditDocument(_) => {
                vec![Guard::Authenticated, Guard::Role(vec![Role::Submitter])]
            }
        }
    }

    pub fn navigate(&self, session: &Session) -> GuardOutcome {
        let outcome = evaluate(&self.guards(), session);
        if let GuardOutcome::Redirect(dest) = outcome {
            tracing::debug!(route = %self.path(), redirect = dest.path(), "navigation redirected");
        }
        outcome
    }
}
