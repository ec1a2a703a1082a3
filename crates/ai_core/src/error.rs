//! Client errors

use thiserror::Error;

/// Outcome classes of one [`crate::AssistantClient::ask`] call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistantError {
    /// Query or locale rejected before any network I/O
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Bounded wait expired; the request was abandoned
    #[error("Assistant timeout after {0}ms")]
    Timeout(u64),

    /// Backend returned 5xx or could not be reached
    #[error("Upstream unavailable (status {status:?}): {message}")]
    UpstreamUnavailable {
        status: Option<u16>,
        message: String,
    },

    /// Backend returned 4xx
    #[error("Request rejected (status {status}): {message}")]
    RequestRejected { status: u16, message: String },

    /// Success response without usable reply text
    #[error("Received empty reply")]
    EmptyReply,

    /// HTTP client could not be built
    #[error("Client error: {0}")]
    Client(String),
}

impl AssistantError {
    /// Whether the caller may retry the same request later
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::UpstreamUnavailable { .. })
    }
}

/// Errors of the chat-completion upstream
#[derive(Debug, Error)]
pub enum CompletionError {
    /// No API key configured
    #[error("Completion API key is not configured")]
    MissingApiKey,

    /// Upstream bound expired
    #[error("Completion timeout after {0}ms")]
    Timeout(u64),

    /// Upstream answered with a non-success status
    #[error("Upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    /// Success without `choices[0].message.content`
    #[error("Received empty response from model")]
    EmptyResponse,

    /// Upstream could not be reached
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Response body could not be parsed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// HTTP client could not be built
    #[error("Client error: {0}")]
    Client(String),
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Client(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classes() {
        assert!(AssistantError::Timeout(25_000).is_retryable());
        assert!(
            AssistantError::UpstreamUnavailable {
                status: Some(503),
                message: String::new(),
            }
            .is_retryable()
        );
        assert!(
            !AssistantError::RequestRejected {
                status: 400,
                message: String::new(),
            }
            .is_retryable()
        );
        assert!(!AssistantError::EmptyReply.is_retryable());
        assert!(!AssistantError::InvalidInput("x".into()).is_retryable());
    }

    #[test]
    fn messages() {
        assert_eq!(
            AssistantError::Timeout(25_000).to_string(),
            "Assistant timeout after 25000ms"
        );
        assert_eq!(
            CompletionError::EmptyResponse.to_string(),
            "Received empty response from model"
        );
    }
}
