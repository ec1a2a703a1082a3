//! Shared error mapping for the key-value stores

use std::io;

use application::error::ApplicationError;

/// Map an I/O error on `key` to an application-layer error
pub fn map_io_error(key: &str, e: &io::Error) -> ApplicationError {
    ApplicationError::Persistence(format!("key '{key}': {e}"))
}
