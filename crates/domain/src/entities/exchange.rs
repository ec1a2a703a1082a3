//! Exchange entity - one answered query

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ExchangeId, Locale, Query};

/// One user query paired with the assistant's reply
///
/// Created only after a successful round trip, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    id: ExchangeId,
    query: Query,
    reply: String,
    locale: Locale,
    timestamp: DateTime<Utc>,
}

impl Exchange {
    /// Record a new exchange happening now
    pub fn new(query: Query, reply: impl Into<String>, locale: Locale) -> Self {
        Self {
            id: ExchangeId::new(),
            query,
            reply: reply.into(),
            locale,
            timestamp: Utc::now(),
        }
    }

    /// Rebuild an exchange with known identity and time
    pub fn restore(
        id: ExchangeId,
        query: Query,
        reply: impl Into<String>,
        locale: Locale,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            query,
            reply: reply.into(),
            locale,
            timestamp,
        }
    }

    pub const fn id(&self) -> ExchangeId {
        self.id
    }

    pub const fn query(&self) -> &Query {
        &self.query
    }

    pub fn reply(&self) -> &str {
        &self.reply
    }

    pub const fn locale(&self) -> Locale {
        self.locale
    }

    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// A usable exchange carries reply text
    pub fn has_reply(&self) -> bool {
        !self.reply.trim().is_empty()
    }
}
