//! Bookmarks: stable identifiers for domain object instances
//!
//! Format: `<logical type name>:<identifier>`, e.g. `crm.Customer:42`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical type name plus an instance identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bookmark {
    logical_type_name: String,
    identifier: String,
}

/// Error when parsing a bookmark string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkParseError {
    /// No `:` separator
    MissingSeparator,
    /// Logical type name part is empty
    EmptyLogicalTypeName,
}

impl fmt::Display for BookmarkParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkParseError::MissingSeparator => {
                write!(f, "bookmark must have the form '<type>:<id>'")
            }
            BookmarkParseError::EmptyLogicalTypeName => {
                write!(f, "bookmark logical type name is empty")
            }
        }
    }
}

impl std::error::Error for BookmarkParseError {}

impl Bookmark {
    /// Create a bookmark
    pub fn new(logical_type_name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            logical_type_name: logical_type_name.into(),
            identifier: identifier.into(),
        }
    }

    /// Logical type name
    pub fn logical_type_name(&self) -> &str {
        &self.logical_type_name
    }

    /// Instance identifier
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl FromStr for Bookmark {
    type Err = BookmarkParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ty, id) = s
            .split_once(':')
            .ok_or(BookmarkParseError::MissingSeparator)?;
        if ty.is_empty() {
            return Err(BookmarkParseError::EmptyLogicalTypeName);
        }
        Ok(Bookmark::new(ty, id))
    }
}

impl fmt::Display for Bookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.logical_type_name, self.identifier)
    }
}
