//! Voice Buddy CLI
//!
//! Terminal front end standing in for the voice page: an interactive
//! session where typed lines play the part of recognized speech, one-shot
//! questions, and management of the stored history.

pub mod ask;
pub mod cli;
pub mod history;
pub mod talk;

pub use cli::{Cli, Commands, HistoryAction, log_filter_from_verbosity};
