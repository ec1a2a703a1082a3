//! Speech engine implementations
//!
//! Contains concrete implementations of the `RecognitionEngine` and
//! `SynthesisEngine` traits.

pub mod command;
pub mod line;

pub use command::CommandSynthesisEngine;
pub use line::LineRecognitionEngine;
