//! Key-value store port - Durable client-side storage
//!
//! Values are opaque strings; callers validate what they read back.
//! Writes are synchronous and last-write-wins.

#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for a string key-value store
#[cfg_attr(test, automock)]
pub trait KeyValueStorePort: Send + Sync {
    /// Read the value under `key`
    fn get(&self, key: &str) -> Result<Option<String>, ApplicationError>;

    /// Replace the value under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), ApplicationError>;

    /// Delete `key`. Deleting a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), ApplicationError>;
}
