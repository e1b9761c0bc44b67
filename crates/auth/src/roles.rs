use core::str::FromStr;

use serde::{Deserialize, Serialize};

use docflow_core::DomainError;

/// Role of a registered user.
///
/// The server still emits `USER` for submitters on older deployments, so it is
/// accepted as an alias on input; output always uses `SUBMITTER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "SUBMITTER", alias = "USER")]
    Submitter,
    #[serde(rename = "REVIEWER")]
    Reviewer,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Submitter, Role::Reviewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Submitter => "SUBMITTER",
            Role::Reviewer => "REVIEWER",
        }
    }

    pub fn is_reviewer(&self) -> bool {
        matches!(self, Role::Reviewer)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUBMITTER" | "USER" => Ok(Role::Submitter),
            "REVIEWER" => Ok(Role::Reviewer),
            _ => Err(DomainError::parse("role", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_accepts_legacy_user_alias() {
        let role: Role = serde_json::from_str("\"USER\"").unwrap();
        assert_eq!(role, Role::Submitter);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"SUBMITTER\"");
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("reviewer".parse::<Role>().unwrap(), Role::Reviewer);
        assert!("admin".parse::<Role>().is_err());
    }
}
