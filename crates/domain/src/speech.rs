//! Events emitted by the speech capture and playback capabilities

use serde::{Deserialize, Serialize};

use crate::value_objects::FailureKind;

/// Events reported while capturing speech
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum CaptureEvent {
    /// Microphone acquired, recognition running
    Started,
    /// Current interim hypothesis for the span
    Interim(String),
    /// Committed text. May fire several times in one span.
    Final(String),
    /// Capture stopped without any recognized text
    NoSpeech,
    /// Recognizer reported an error
    Error(CaptureErrorKind),
    /// Microphone released
    Ended,
}

/// Recognition error classes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureErrorKind {
    /// No recognizer available
    Unsupported,
    /// Microphone permission denied
    NotAllowed,
    /// Recognizer heard nothing
    NoSpeech,
    /// Audio device failure
    AudioCapture,
    /// Recognition service unreachable
    Network,
    /// Capture aborted on request
    Aborted,
    /// Anything else, with the raw engine code
    Other(String),
}

impl CaptureErrorKind {
    /// Map a recognizer error code
    pub fn from_code(code: &str) -> Self {
        match code {
            "not-supported" | "language-not-supported" => Self::Unsupported,
            "not-allowed" | "service-not-allowed" => Self::NotAllowed,
            "no-speech" => Self::NoSpeech,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            "aborted" => Self::Aborted,
            other => Self::Other(other.to_string()),
        }
    }

    /// Session failure this error amounts to. `Aborted` is the echo of our own
    /// cancellation and is not a failure.
    pub const fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Aborted => None,
            Self::Unsupported => Some(FailureKind::UnsupportedCapability),
            Self::NoSpeech => Some(FailureKind::NoSpeechDetected),
            Self::NotAllowed | Self::AudioCapture | Self::Network | Self::Other(_) => {
                Some(FailureKind::CaptureFailure)
            },
        }
    }
}

/// Events reported while speaking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum PlaybackEvent {
    Started,
    Ended,
    Error(PlaybackErrorKind),
}

/// Synthesis error classes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackErrorKind {
    /// No synthesizer available
    Unsupported,
    /// Utterance replaced by a newer one
    Interrupted,
    /// Utterance canceled on request
    Canceled,
    /// Output device busy
    AudioBusy,
    /// No voice for the requested language
    LanguageUnavailable,
    /// Synthesizer failed
    SynthesisFailed,
    /// Anything else, with the raw engine code
    Other(String),
}

impl PlaybackErrorKind {
    /// Map a synthesizer error code
    pub fn from_code(code: &str) -> Self {
        match code {
            "synthesis-unavailable" | "not-supported" => Self::Unsupported,
            "interrupted" => Self::Interrupted,
            "canceled" => Self::Canceled,
            "audio-busy" | "audio-hardware" => Self::AudioBusy,
            "language-unavailable" | "voice-unavailable" => Self::LanguageUnavailable,
            "synthesis-failed" => Self::SynthesisFailed,
            other => Self::Other(other.to_string()),
        }
    }

    /// Errors caused by our own cancel or preemption
    pub const fn is_preemption(&self) -> bool {
        matches!(self, Self::Interrupted | Self::Canceled)
    }
}
