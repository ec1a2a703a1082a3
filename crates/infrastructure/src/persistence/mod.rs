//! Persistence module
//!
//! String key-value stores backing the history and settings stores: one
//! file per key on disk, or a map in memory.

mod error;
mod file_store;
mod memory_store;

pub use file_store::FileKeyValueStore;
pub use memory_store::InMemoryKeyValueStore;
