//! Failure taxonomy of a voice interaction and its localized messages

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Locale;

/// Classes of failure a voice session can run into
///
/// Every kind is recoverable: the session always ends up back in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Empty or too long query, unsupported locale
    InvalidInput,
    /// Speech capture or synthesis is not available
    UnsupportedCapability,
    /// Listening ended with an empty transcript
    NoSpeechDetected,
    /// Network call exceeded its bound
    Timeout,
    /// Backend answered with a server error or could not be reached
    UpstreamUnavailable,
    /// Backend refused the request
    RequestRejected,
    /// Backend succeeded without usable reply text
    EmptyReply,
    /// History could not be written
    PersistenceFailure,
    /// Speech synthesis failed
    PlaybackFailure,
    /// Speech recognition reported a device, permission or network error
    CaptureFailure,
}

impl FailureKind {
    /// Stable snake_case code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::UnsupportedCapability => "unsupported_capability",
            Self::NoSpeechDetected => "no_speech_detected",
            Self::Timeout => "timeout",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::RequestRejected => "request_rejected",
            Self::EmptyReply => "empty_reply",
            Self::PersistenceFailure => "persistence_failure",
            Self::PlaybackFailure => "playback_failure",
            Self::CaptureFailure => "capture_failure",
        }
    }

    /// Whether repeating the same request later may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::UpstreamUnavailable | Self::NoSpeechDetected | Self::CaptureFailure
        )
    }

    /// Persistence failures never reach the user
    #[must_use]
    pub const fn is_user_visible(&self) -> bool {
        !matches!(self, Self::PersistenceFailure)
    }

    /// Message shown (and possibly spoken) to the user
    #[must_use]
    pub const fn user_message(&self, locale: Locale) -> &'static str {
        match (*self, locale) {
            (Self::NoSpeechDetected, Locale::En) => "No speech detected. Please try again.",
            (Self::NoSpeechDetected, Locale::Hi) => "कोई आवाज़ नहीं मिली। कृपया पुनः प्रयास करें।",
            (Self::UnsupportedCapability, Locale::En) => "Speech recognition not supported",
            (Self::UnsupportedCapability, Locale::Hi) => "वॉइस रिकग्निशन सपोर्ट नहीं है",
            (Self::CaptureFailure, Locale::En) => "Failed to start speech recognition",
            (Self::CaptureFailure, Locale::Hi) => "वॉइस रिकग्निशन शुरू करने में विफल",
            (Self::PlaybackFailure, Locale::En) => "Failed to start speech synthesis",
            (Self::PlaybackFailure, Locale::Hi) => "ध्वनि प्रारंभ करने में विफल",
            (Self::PersistenceFailure, _) => "",
            (
                Self::InvalidInput
                | Self::Timeout
                | Self::UpstreamUnavailable
                | Self::RequestRejected
                | Self::EmptyReply,
                Locale::En,
            ) => "Error processing voice command. Please try again.",
            (
                Self::InvalidInput
                | Self::Timeout
                | Self::UpstreamUnavailable
                | Self::RequestRejected
                | Self::EmptyReply,
                Locale::Hi,
            ) => "आदेश प्रसंस्करण में त्रुटि। कृपया पुनः प्रयास करें।",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
