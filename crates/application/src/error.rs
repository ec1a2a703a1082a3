//! Application-level errors

use domain::{DomainError, FailureKind};
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Request rejected before any I/O
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Bounded wait expired
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Backend failed or could not be reached
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Backend refused the request
    #[error("Request rejected: {0}")]
    RequestRejected(String),

    /// Backend answered without reply text
    #[error("Received empty reply")]
    EmptyReply,

    /// Storage read or write failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Speech synthesis failed
    #[error("Playback error: {0}")]
    Playback(String),

    /// Speech recognition failed
    #[error("Capture error: {0}")]
    Capture(String),

    /// Capability missing on this host
    #[error("Unsupported capability: {0}")]
    UnsupportedCapability(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Session failure class of this error
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Domain(_) | Self::InvalidInput(_) => FailureKind::InvalidInput,
            Self::Timeout(_) => FailureKind::Timeout,
            Self::UpstreamUnavailable(_) | Self::Configuration(_) | Self::Internal(_) => {
                FailureKind::UpstreamUnavailable
            },
            Self::RequestRejected(_) => FailureKind::RequestRejected,
            Self::EmptyReply => FailureKind::EmptyReply,
            Self::Persistence(_) => FailureKind::PersistenceFailure,
            Self::Playback(_) => FailureKind::PlaybackFailure,
            Self::Capture(_) => FailureKind::CaptureFailure,
            Self::UnsupportedCapability(_) => FailureKind::UnsupportedCapability,
        }
    }

    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}
