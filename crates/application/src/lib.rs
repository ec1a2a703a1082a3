//! Application layer - Use cases and orchestration
//!
//! Contains the voice session state machine and its controller, the history
//! and settings stores, the backend proxy use case and the port definitions
//! implemented by the infrastructure layer.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
