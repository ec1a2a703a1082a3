//! Domain layer for Voice Buddy
//!
//! Contains the vocabulary of a voice interaction: locales, validated queries,
//! exchanges and their bounded history, transcripts, session states, the
//! failure taxonomy and the events emitted by speech capabilities.
//! This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod speech;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use speech::{CaptureErrorKind, CaptureEvent, PlaybackErrorKind, PlaybackEvent};
pub use value_objects::*;
