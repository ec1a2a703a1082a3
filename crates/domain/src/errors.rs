//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Query is empty after trimming
    #[error("Query must be a non-empty string")]
    EmptyQuery,

    /// Query exceeds the maximum length
    #[error("Query too long: {length} characters exceeds maximum of {max}")]
    QueryTooLong { length: usize, max: usize },

    /// Locale outside the supported set
    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),

    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_error_message_is_correct() {
        let err = DomainError::not_found("Exchange", "123");
        assert_eq!(err.to_string(), "Exchange not found: 123");
    }

    #[test]
    fn empty_query_message() {
        assert_eq!(
            DomainError::EmptyQuery.to_string(),
            "Query must be a non-empty string"
        );
    }

    #[test]
    fn query_too_long_message() {
        let err = DomainError::QueryTooLong {
            length: 501,
            max: 500,
        };
        assert_eq!(
            err.to_string(),
            "Query too long: 501 characters exceeds maximum of 500"
        );
    }

    #[test]
    fn unsupported_locale_message() {
        let err = DomainError::UnsupportedLocale("fr".to_string());
        assert_eq!(err.to_string(), "Unsupported locale: fr");
    }
}
