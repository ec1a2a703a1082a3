//! Speech processing errors

use domain::{CaptureErrorKind, PlaybackErrorKind};
use thiserror::Error;

/// Errors that can occur during speech capture or playback
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Capability not present on this host
    #[error("Provider not available: {0}")]
    NotAvailable(String),

    /// Microphone or output permission refused
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Audio device failure
    #[error("Audio device error: {0}")]
    AudioDevice(String),

    /// Recognition failed
    #[error("Recognition failed: {0}")]
    RecognitionFailed(String),

    /// Synthesis failed
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SpeechError {
    /// Capture error class reported to the session
    pub fn capture_kind(&self) -> CaptureErrorKind {
        match self {
            Self::NotAvailable(_) => CaptureErrorKind::Unsupported,
            Self::PermissionDenied(_) => CaptureErrorKind::NotAllowed,
            Self::AudioDevice(_) => CaptureErrorKind::AudioCapture,
            Self::RecognitionFailed(msg) | Self::SynthesisFailed(msg) | Self::Configuration(msg) => {
                CaptureErrorKind::Other(msg.clone())
            },
        }
    }

    /// Playback error class reported to the session
    pub fn playback_kind(&self) -> PlaybackErrorKind {
        match self {
            Self::NotAvailable(_) => PlaybackErrorKind::Unsupported,
            Self::AudioDevice(_) | Self::PermissionDenied(_) => PlaybackErrorKind::AudioBusy,
            Self::SynthesisFailed(_) | Self::RecognitionFailed(_) | Self::Configuration(_) => {
                PlaybackErrorKind::SynthesisFailed
            },
        }
    }
}
