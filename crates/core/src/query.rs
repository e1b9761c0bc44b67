//! Pagination and sorting primitives shared by every list endpoint.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A page window. Pages are 1-based, matching the server's `page` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Result<Self, DomainError> {
        if page == 0 {
            return Err(DomainError::validation("page must be >= 1"));
        }
        if size == 0 {
            return Err(DomainError::validation("page size must be positive"));
        }
        Ok(Self { page, size })
    }

    pub fn first(size: u32) -> Self {
        Self {
            page: 1,
            size: size.max(1),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort key in the server's `field,direction` form (e.g. `updatedAt,desc`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

impl core::fmt::Display for SortKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{},{}", self.field, self.direction.as_str())
    }
}

impl FromStr for SortKey {
    type Err = DomainError;

    /// Accepts `field` (ascending) or `field,asc|desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(',') {
            Some((field, dir)) => {
                let direction = match dir.trim().to_ascii_lowercase().as_str() {
                    "asc" => SortDirection::Asc,
                    "desc" => SortDirection::Desc,
                    _ => return Err(DomainError::parse("sort direction", dir)),
                };
                (field.trim(), direction)
            }
            None => (s.trim(), SortDirection::Asc),
        };

        if field.is_empty() {
            return Err(DomainError::parse("sort key", s));
        }

        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}
