//! API error handling
//!
//! Every failure is answered with `{ "error": "..." }`. Upstream and internal
//! details stay in the logs; clients only see fixed messages.

use application::{ApplicationError, EMPTY_QUERY_MESSAGE};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub const CONFIGURATION_MESSAGE: &str = "Service configuration error";
pub const TIMEOUT_MESSAGE: &str = "Request timeout. Please try again.";
pub const UPSTREAM_MESSAGE: &str = "Unable to process request. Please try again.";
pub const EMPTY_REPLY_MESSAGE: &str = "Received empty response from model";
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Upstream credentials missing
    #[error("Service configuration error")]
    Configuration,

    /// Body is not JSON
    #[error("Malformed request body")]
    MalformedBody,

    /// Request failed validation; the message is shown to the client
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Upstream call exceeded its bound
    #[error("Upstream timeout")]
    Timeout,

    /// Upstream answered 5xx or could not be reached
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Upstream refused the request
    #[error("Upstream rejected request: {0}")]
    UpstreamRejected(String),

    /// Upstream answered without content
    #[error("Empty reply")]
    EmptyReply,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl ApiError {
    /// Status code of this error
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Configuration | Self::EmptyReply | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
            Self::MalformedBody | Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpstreamRejected(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message shown to the client
    pub fn public_message(&self) -> String {
        match self {
            Self::Configuration => CONFIGURATION_MESSAGE.to_string(),
            Self::MalformedBody => EMPTY_QUERY_MESSAGE.to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::Timeout => TIMEOUT_MESSAGE.to_string(),
            Self::UpstreamUnavailable(_) | Self::UpstreamRejected(_) => {
                UPSTREAM_MESSAGE.to_string()
            },
            Self::EmptyReply => EMPTY_REPLY_MESSAGE.to_string(),
            Self::Internal(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Configuration => error!("Completion API key not configured"),
            Self::Internal(detail) => error!(%detail, "Voice request failed"),
            Self::UpstreamUnavailable(detail) | Self::UpstreamRejected(detail) => {
                warn!(%detail, status = status.as_u16(), "Upstream error");
            },
            _ => {},
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Configuration(_) => Self::Configuration,
            ApplicationError::InvalidInput(msg) => Self::Validation(msg),
            ApplicationError::Domain(e) => Self::Validation(e.to_string()),
            ApplicationError::Timeout(_) => Self::Timeout,
            ApplicationError::UpstreamUnavailable(msg) => Self::UpstreamUnavailable(msg),
            ApplicationError::RequestRejected(msg) => Self::UpstreamRejected(msg),
            ApplicationError::EmptyReply => Self::EmptyReply,
            other @ (ApplicationError::Persistence(_)
            | ApplicationError::Playback(_)
            | ApplicationError::Capture(_)
            | ApplicationError::UnsupportedCapability(_)
            | ApplicationError::Internal(_)) => Self::Internal(other.to_string()),
        }
    }
}
