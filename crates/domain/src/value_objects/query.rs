//! Validated user query

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Maximum number of characters accepted in a query
pub const MAX_QUERY_CHARS: usize = 500;

/// A user query that is non-empty after trimming and at most
/// [`MAX_QUERY_CHARS`] characters long.
///
/// The length limit applies to the text as received, the stored value is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Query(String);

impl Query {
    /// Validate and create a query
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyQuery);
        }

        let length = raw.chars().count();
        if length > MAX_QUERY_CHARS {
            return Err(DomainError::QueryTooLong {
                length,
                max: MAX_QUERY_CHARS,
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The trimmed query text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Character count of the trimmed query
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Query {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Query {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Query> for String {
    fn from(query: Query) -> Self {
        query.0
    }
}
