//! Client-side storage configuration.

use std::{path::PathBuf, sync::Arc};

use application::{
    DEFAULT_HISTORY_KEY, DEFAULT_SETTINGS_KEY, error::ApplicationError, ports::KeyValueStorePort,
};
use domain::DEFAULT_HISTORY_CAP;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::default_true;
use crate::persistence::{FileKeyValueStore, InMemoryKeyValueStore};

/// Storage configuration for history and settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Keep values on disk; `false` keeps them for the process lifetime only
    #[serde(default = "default_true")]
    pub persistent: bool,

    /// Directory holding one file per key
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Key of the exchange history
    #[serde(default = "default_history_key")]
    pub history_key: String,

    /// Key of the user settings
    #[serde(default = "default_settings_key")]
    pub settings_key: String,

    /// Maximum number of exchanges kept
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_history_key() -> String {
    DEFAULT_HISTORY_KEY.to_string()
}

fn default_settings_key() -> String {
    DEFAULT_SETTINGS_KEY.to_string()
}

const fn default_history_cap() -> usize {
    DEFAULT_HISTORY_CAP
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            persistent: true,
            data_dir: default_data_dir(),
            history_key: default_history_key(),
            settings_key: default_settings_key(),
            history_cap: default_history_cap(),
        }
    }
}

impl StorageConfig {
    /// Open the configured key-value store
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the data directory cannot be created.
    pub fn open_store(&self) -> Result<Arc<dyn KeyValueStorePort>, ApplicationError> {
        if self.persistent {
            let store = FileKeyValueStore::open(&self.data_dir)?;
            info!(dir = %self.data_dir.display(), "Using file storage");
            Ok(Arc::new(store))
        } else {
            info!("Using in-memory storage");
            Ok(Arc::new(InMemoryKeyValueStore::new()))
        }
    }
}
