//! Registered user profile, as seen by the client.
//!
//! Profiles are owned by the server; the client never mutates them.

use serde::{Deserialize, Serialize};

use docflow_core::{DomainError, UserId};

use crate::Role;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

impl User {
    pub fn is_reviewer(&self) -> bool {
        self.role.is_reviewer()
    }

    /// Case-insensitive substring match over email or full name.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.email.to_lowercase().contains(&needle)
            || self.full_name.to_lowercase().contains(&needle)
    }
}

/// Registration payload for `POST /user/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

impl RegisterUser {
    /// Validate and normalize the request before it leaves the client.
    pub fn validated(self) -> Result<Self, DomainError> {
        let email = self.email.trim().to_lowercase();
        if !looks_like_email(&email) {
            return Err(DomainError::validation("invalid email format"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let full_name = self.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(DomainError::validation("full name is required"));
        }

        Ok(Self {
            email,
            password: self.password,
            full_name,
            role: self.role,
        })
    }
}

/// Basic shape check: `local@domain.tld`, no whitespace.
pub(crate) fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}
