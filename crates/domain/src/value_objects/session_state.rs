//! Voice session state

use std::fmt;

use serde::{Deserialize, Serialize};

use super::FailureKind;

/// The single active state of a voice session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "failure")]
pub enum SessionState {
    /// Waiting for the user to start listening
    #[default]
    Idle,
    /// Microphone open, transcript accumulating
    Listening,
    /// Transcript sent to the assistant, awaiting the reply
    Submitting,
    /// Reply being spoken
    Speaking,
    /// Transient failure state, always followed by `Idle`
    Error(FailureKind),
}

impl SessionState {
    /// State name without the failure detail
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::Submitting => "submitting",
            Self::Speaking => "speaking",
            Self::Error(_) => "error",
        }
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Failure carried by the `Error` state
    #[must_use]
    pub const fn failure(&self) -> Option<FailureKind> {
        match self {
            Self::Error(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(kind) => write!(f, "error({kind})"),
            other => f.write_str(other.name()),
        }
    }
}
