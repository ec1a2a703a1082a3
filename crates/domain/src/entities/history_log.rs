//! Bounded, most-recent-first log of exchanges

use std::collections::{HashSet, VecDeque};

use crate::{errors::DomainError, value_objects::ExchangeId};

use super::Exchange;

/// Default number of exchanges kept
pub const DEFAULT_HISTORY_CAP: usize = 50;

/// Ordered exchanges, newest first, never longer than `cap`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog {
    entries: VecDeque<Exchange>,
    cap: usize,
}

impl HistoryLog {
    /// Create an empty log. A zero cap is raised to one.
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            entries: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Rebuild a log from persisted entries (newest first).
    ///
    /// The entries are taken all or nothing. Too many entries, a duplicate
    /// id, an exchange without reply text or an entry newer than the one
    /// before it rejects the whole set.
    pub fn from_entries(entries: Vec<Exchange>, cap: usize) -> Result<Self, DomainError> {
        let mut log = Self::new(cap);
        if entries.len() > log.cap {
            return Err(DomainError::ValidationError(format!(
                "history holds {} entries, cap is {}",
                entries.len(),
                log.cap
            )));
        }

        let mut seen = HashSet::with_capacity(entries.len());
        for exchange in &entries {
            if !seen.insert(exchange.id()) {
                return Err(DomainError::ValidationError(format!(
                    "duplicate exchange id {}",
                    exchange.id()
                )));
            }
            if !exchange.has_reply() {
                return Err(DomainError::ValidationError(format!(
                    "exchange {} has no reply",
                    exchange.id()
                )));
            }
        }

        if let Some(pair) = entries
            .windows(2)
            .find(|pair| pair[1].timestamp() > pair[0].timestamp())
        {
            return Err(DomainError::ValidationError(format!(
                "exchange {} is newer than exchange {} before it",
                pair[1].id(),
                pair[0].id()
            )));
        }

        log.entries = entries.into();
        Ok(log)
    }

    /// Insert at the front, returning the evicted oldest entry when over cap
    pub fn push(&mut self, exchange: Exchange) -> Option<Exchange> {
        self.entries.push_front(exchange);
        if self.entries.len() > self.cap {
            self.entries.pop_back()
        } else {
            None
        }
    }

    /// Remove one entry by identity
    pub fn remove(&mut self, id: ExchangeId) -> Result<Exchange, DomainError> {
        let position = self
            .entries
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| DomainError::not_found("Exchange", id.to_string()))?;
        self.entries
            .remove(position)
            .ok_or_else(|| DomainError::not_found("Exchange", id.to_string()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, id: ExchangeId) -> Option<&Exchange> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// Entries newest first
    pub fn iter(&self) -> impl Iterator<Item = &Exchange> {
        self.entries.iter()
    }

    /// Snapshot of the entries, newest first
    pub fn to_vec(&self) -> Vec<Exchange> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn cap(&self) -> usize {
        self.cap
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}
