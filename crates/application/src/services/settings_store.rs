//! Settings store - Session-level user preferences

use std::{fmt, sync::Arc};

use domain::Locale;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ports::KeyValueStorePort;

/// Storage key used when none is configured
pub const DEFAULT_SETTINGS_KEY: &str = "voice-settings";

/// Persisted user preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Interaction language
    #[serde(default)]
    pub locale: Locale,
}

/// Service owning the persisted settings
pub struct SettingsStore {
    storage: Arc<dyn KeyValueStorePort>,
    key: String,
    current: RwLock<Settings>,
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("key", &self.key)
            .field("current", &*self.current.read())
            .finish_non_exhaustive()
    }
}

impl SettingsStore {
    /// Open the store and load what is persisted under `key`.
    /// Malformed data falls back to defaults and is removed.
    pub fn open(storage: Arc<dyn KeyValueStorePort>, key: impl Into<String>) -> Self {
        let key = key.into();
        let current = match storage.get(&key) {
            Ok(Some(raw)) => serde_json::from_str::<Settings>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding malformed settings");
                if let Err(e) = storage.remove(&key) {
                    warn!(error = %e, "Failed to clear malformed settings");
                }
                Settings::default()
            }),
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read settings, using defaults");
                Settings::default()
            },
        };

        Self {
            storage,
            key,
            current: RwLock::new(current),
        }
    }

    pub fn settings(&self) -> Settings {
        *self.current.read()
    }

    pub fn locale(&self) -> Locale {
        self.current.read().locale
    }

    /// Store a new locale preference. Persistence is best-effort.
    pub fn set_locale(&self, locale: Locale) {
        let settings = {
            let mut current = self.current.write();
            current.locale = locale;
            *current
        };
        debug!(%locale, "Locale preference changed");

        match serde_json::to_string(&settings) {
            Ok(json) => {
                if let Err(e) = self.storage.set(&self.key, &json) {
                    warn!(error = %e, "Failed to persist settings");
                }
            },
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }
}
