//! Infrastructure layer - Adapters for external systems
//!
//! Implements the application ports on top of the HTTP clients in `ai_core`,
//! the speech adapters in `ai_speech` and the local filesystem. Also owns
//! configuration loading and logging setup shared by both binaries.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, ServerConfig, SessionSettings, StorageConfig};
pub use persistence::{FileKeyValueStore, InMemoryKeyValueStore};
pub use telemetry::{LogFormat, TelemetryError, init_logging};
