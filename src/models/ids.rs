//! Identifier types for budget entities
//!
//! Categories use stable lowercase slugs (`venue`, `photography`) so that
//! assistant patches can address them by name. Contracts and proposals use
//! random UUID newtypes generated by the `define_id!` macro.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate UUID-backed ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, &self.0.to_string()[..8])
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(ContractId, "ctr-");
define_id!(ProposalId, "prp-");

/// Stable, lowercase slug identifying a budget category
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryId(String);

impl CategoryId {
    /// Parse an existing slug, rejecting anything that is not `[a-z0-9-]+`
    pub fn parse(s: &str) -> Result<Self, CategoryIdError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CategoryIdError::Empty);
        }
        if s.starts_with('-')
            || s.ends_with('-')
            || !s
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(CategoryIdError::NotASlug(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Derive a slug from a display name ("Hair & Makeup" -> "hair-makeup")
    pub fn from_name(name: &str) -> Self {
        let mut slug = String::with_capacity(name.len());
        for c in name.trim().chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        if slug.is_empty() {
            slug.push_str("category");
        }
        Self(slug)
    }

    /// The same slug with a numeric suffix ("flowers" -> "flowers-2")
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{}", self.0, n))
    }

    /// Get the slug as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CategoryId {
    type Err = CategoryIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CategoryId {
    type Error = CategoryIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CategoryId> for String {
    fn from(id: CategoryId) -> Self {
        id.0
    }
}

/// Errors for category slugs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryIdError {
    Empty,
    NotASlug(String),
}

impl fmt::Display for CategoryIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Category id cannot be empty"),
            Self::NotASlug(s) => write!(
                f,
                "Category id '{}' must be a lowercase slug (a-z, 0-9, '-')",
                s
            ),
        }
    }
}

impl std::error::Error for CategoryIdError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_id_display() {
        let id = ContractId::new();
        let display = format!("{}", id);
        assert!(display.starts_with("ctr-"));
        assert_eq!(display.len(), 12);
    }

    #[test]
    fn test_uuid_id_parse_with_prefix() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id: ContractId = format!("ctr-{}", uuid_str).parse().unwrap();
        assert_eq!(id.as_uuid().to_string(), uuid_str);
    }

    #[test]
    fn test_slug_from_name() {
        assert_eq!(CategoryId::from_name("Venue").as_str(), "venue");
        assert_eq!(CategoryId::from_name("Hair & Makeup").as_str(), "hair-makeup");
        assert_eq!(CategoryId::from_name("  Rings!  ").as_str(), "rings");
        assert_eq!(CategoryId::from_name("???").as_str(), "category");
    }

    #[test]
    fn test_slug_parse() {
        assert!(CategoryId::parse("party-bus").is_ok());
        assert_eq!(CategoryId::parse(""), Err(CategoryIdError::Empty));
        assert!(matches!(
            CategoryId::parse("Venue"),
            Err(CategoryIdError::NotASlug(_))
        ));
        assert!(CategoryId::parse("-venue").is_err());
    }

    #[test]
    fn test_slug_suffix() {
        let id = CategoryId::from_name("Flowers");
        assert_eq!(id.with_suffix(2).as_str(), "flowers-2");
    }

    #[test]
    fn test_slug_serialization() {
        let id = CategoryId::parse("venue").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"venue\"");
        assert!(serde_json::from_str::<CategoryId>("\"Not A Slug\"").is_err());
    }
}
