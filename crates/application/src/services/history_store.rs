//! History store - Bounded, persisted log of past exchanges
//!
//! History is best-effort: write failures are logged and swallowed, and
//! malformed persisted data is discarded as a whole.

use std::{fmt, sync::Arc};

use domain::{DEFAULT_HISTORY_CAP, Exchange, ExchangeId, HistoryLog};
use parking_lot::RwLock;
use tracing::{debug, instrument, warn};

use crate::ports::KeyValueStorePort;

/// Storage key used when none is configured
pub const DEFAULT_HISTORY_KEY: &str = "voice-history";

/// Service owning the exchange history
pub struct HistoryStore {
    storage: Arc<dyn KeyValueStorePort>,
    key: String,
    log: RwLock<HistoryLog>,
}

impl fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryStore")
            .field("key", &self.key)
            .field("len", &self.log.read().len())
            .finish_non_exhaustive()
    }
}

impl HistoryStore {
    /// Create an empty store with the default key and cap
    pub fn new(storage: Arc<dyn KeyValueStorePort>) -> Self {
        Self::with_settings(storage, DEFAULT_HISTORY_KEY, DEFAULT_HISTORY_CAP)
    }

    /// Create an empty store with a custom key and cap
    pub fn with_settings(
        storage: Arc<dyn KeyValueStorePort>,
        key: impl Into<String>,
        cap: usize,
    ) -> Self {
        Self {
            storage,
            key: key.into(),
            log: RwLock::new(HistoryLog::new(cap)),
        }
    }

    /// Create a store and immediately load persisted history
    pub fn open(storage: Arc<dyn KeyValueStorePort>, key: impl Into<String>, cap: usize) -> Self {
        let store = Self::with_settings(storage, key, cap);
        store.load();
        store
    }

    /// Rebuild the in-memory log from storage.
    ///
    /// Anything that is not an array of valid exchanges within the cap is
    /// dropped and the persisted value is cleared. Returns the number of
    /// entries loaded.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn load(&self) -> usize {
        let cap = self.log.read().cap();

        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                *self.log.write() = HistoryLog::new(cap);
                return 0;
            },
            Err(e) => {
                warn!(error = %e, "Failed to read history, starting empty");
                *self.log.write() = HistoryLog::new(cap);
                return 0;
            },
        };

        let restored = serde_json::from_str::<Vec<Exchange>>(&raw)
            .map_err(|e| e.to_string())
            .and_then(|entries| HistoryLog::from_entries(entries, cap).map_err(|e| e.to_string()));

        match restored {
            Ok(log) => {
                let count = log.len();
                *self.log.write() = log;
                debug!(count, "History loaded");
                count
            },
            Err(reason) => {
                warn!(%reason, "Discarding malformed history");
                *self.log.write() = HistoryLog::new(cap);
                if let Err(e) = self.storage.remove(&self.key) {
                    warn!(error = %e, "Failed to clear malformed history");
                }
                0
            },
        }
    }

    /// Insert an exchange at the front, evicting the oldest beyond the cap
    #[instrument(skip(self, exchange), fields(id = %exchange.id(), locale = %exchange.locale()))]
    pub fn append(&self, exchange: Exchange) {
        let snapshot = {
            let mut log = self.log.write();
            if let Some(evicted) = log.push(exchange) {
                debug!(evicted = %evicted.id(), "Evicted oldest exchange");
            }
            log.to_vec()
        };
        self.persist(&snapshot);
    }

    /// Entries, most recent first
    pub fn list(&self) -> Vec<Exchange> {
        self.log.read().to_vec()
    }

    pub fn get(&self, id: ExchangeId) -> Option<Exchange> {
        self.log.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.log.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.read().is_empty()
    }

    /// Empty the log and persist the empty state
    #[instrument(skip(self))]
    pub fn clear(&self) {
        self.log.write().clear();
        self.persist(&[]);
    }

    /// Remove one exchange by id. Returns false when it was not present.
    #[instrument(skip(self))]
    pub fn remove(&self, id: ExchangeId) -> bool {
        let snapshot = {
            let mut log = self.log.write();
            if log.remove(id).is_err() {
                return false;
            }
            log.to_vec()
        };
        self.persist(&snapshot);
        true
    }

    fn persist(&self, entries: &[Exchange]) {
        let json = match serde_json::to_string(entries) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize history");
                return;
            },
        };
        if let Err(e) = self.storage.set(&self.key, &json) {
            warn!(error = %e, "Failed to persist history");
        }
    }
}
