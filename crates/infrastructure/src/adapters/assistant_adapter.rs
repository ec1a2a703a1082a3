//! Assistant adapter - Implements AssistantPort using the ai_core voice client

use ai_core::{AssistantClient, AssistantConfig, AssistantError};
use application::error::ApplicationError;
use application::ports::AssistantPort;
use async_trait::async_trait;
use domain::Locale;
use tracing::{debug, instrument};

/// Adapter asking the backend voice endpoint
#[derive(Debug, Clone)]
pub struct AssistantAdapter {
    client: AssistantClient,
}

impl AssistantAdapter {
    /// Create a new assistant adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &AssistantConfig) -> Result<Self, ApplicationError> {
        let client = AssistantClient::new(config).map_err(Self::map_error)?;
        Ok(Self { client })
    }

    /// Map assistant client error to application error
    fn map_error(err: AssistantError) -> ApplicationError {
        match err {
            AssistantError::InvalidInput(e) => ApplicationError::InvalidInput(e),
            AssistantError::Timeout(ms) => ApplicationError::Timeout(ms),
            AssistantError::UpstreamUnavailable { status, message } => match status {
                Some(status) => {
                    ApplicationError::UpstreamUnavailable(format!("HTTP {status}: {message}"))
                },
                None => ApplicationError::UpstreamUnavailable(message),
            },
            AssistantError::RequestRejected { status, message } => {
                ApplicationError::RequestRejected(format!("HTTP {status}: {message}"))
            },
            AssistantError::EmptyReply => ApplicationError::EmptyReply,
            AssistantError::Client(e) => ApplicationError::Configuration(e),
        }
    }
}

#[async_trait]
impl AssistantPort for AssistantAdapter {
    #[instrument(skip(self, query), fields(query_len = query.chars().count(), %locale))]
    async fn ask(&self, query: &str, locale: Locale) -> Result<String, ApplicationError> {
        let reply = self
            .client
            .ask(query, locale.code())
            .await
            .map_err(Self::map_error)?;

        debug!(reply_len = reply.chars().count(), "Assistant replied");
        Ok(reply)
    }
}
