//! Custom error types for the wedding budget engine
//!
//! This module defines the error hierarchy for the engine using thiserror
//! for ergonomic error definitions.
//!
//! Errors fall into three groups:
//! - boundary errors (`InvalidInput`, `InvalidDate`) rejected before any work,
//! - operation-level errors (`NotFound`, `SelfMerge`, `CannotRemoveLastCategory`)
//!   the caller is expected to catch and re-prompt on,
//! - `InvariantViolation`, which means the rebalancing itself is broken and
//!   must never be swallowed.

use thiserror::Error;

/// The main error type for budget engine operations
#[derive(Error, Debug)]
pub enum BudgetError {
    /// Bad total budget, guest count, percentage or id
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Wedding date could not be parsed
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// A category cannot be merged into itself
    #[error("Cannot merge category '{0}' into itself")]
    SelfMerge(String),

    /// The ledger must always keep at least one category
    #[error("Cannot remove '{0}': it is the last remaining category")]
    CannotRemoveLastCategory(String),

    /// Internal consistency check failed
    #[error("Budget invariant violated: {0}")]
    InvariantViolation(String),

    /// The planning session was torn down
    #[error("Planning session has been closed")]
    SessionClosed,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Assistant round trip errors
    #[error("Assistant error: {0}")]
    Assistant(String),
}

impl BudgetError {
    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a boundary validation error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::InvalidDate(_))
    }

    /// Operation-level errors the caller can recover from by re-prompting
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::SelfMerge(_) | Self::CannotRemoveLastCategory(_)
        )
    }

    /// Check if the rebalancing consistency check failed
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

impl From<std::io::Error> for BudgetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BudgetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for budget engine operations
pub type BudgetResult<T> = Result<T, BudgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BudgetError::InvalidInput("total budget must be positive".into());
        assert_eq!(
            err.to_string(),
            "Invalid input: total budget must be positive"
        );
    }

    #[test]
    fn test_not_found_error() {
        let err = BudgetError::category_not_found("parking");
        assert_eq!(err.to_string(), "Category not found: parking");
        assert!(err.is_not_found());
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(BudgetError::SelfMerge("venue".into()).is_recoverable());
        assert!(BudgetError::CannotRemoveLastCategory("venue".into()).is_recoverable());
        assert!(!BudgetError::InvariantViolation("sum 97.00".into()).is_recoverable());
        assert!(BudgetError::InvariantViolation("sum 97.00".into()).is_invariant_violation());
        assert!(BudgetError::InvalidDate("tomorrow".into()).is_invalid_input());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BudgetError = io_err.into();
        assert!(matches!(err, BudgetError::Io(_)));
    }
}
