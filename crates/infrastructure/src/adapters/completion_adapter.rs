//! Completion adapter - Implements CompletionPort using the chat-completion engine

use std::sync::Arc;

use ai_core::{ChatCompletionEngine, CompletionConfig, CompletionError};
use application::error::ApplicationError;
use application::ports::{CompletionPort, CompletionResult};
use async_trait::async_trait;
use domain::{Locale, Query};
use tracing::{debug, instrument, warn};

/// Adapter for the hosted chat-completion model
#[derive(Debug, Clone)]
pub struct CompletionAdapter {
    engine: Arc<ChatCompletionEngine>,
}

impl CompletionAdapter {
    /// Create a new completion adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: CompletionConfig) -> Result<Self, ApplicationError> {
        let engine = ChatCompletionEngine::new(config).map_err(Self::map_error)?;
        Ok(Self {
            engine: Arc::new(engine),
        })
    }

    /// Map completion error to application error
    fn map_error(err: CompletionError) -> ApplicationError {
        match err {
            CompletionError::MissingApiKey => {
                ApplicationError::Configuration("completion API key is not set".to_string())
            },
            CompletionError::Client(e) => ApplicationError::Configuration(e),
            CompletionError::Timeout(ms) => ApplicationError::Timeout(ms),
            CompletionError::Upstream { status, message } if status >= 500 => {
                ApplicationError::UpstreamUnavailable(format!("HTTP {status}: {message}"))
            },
            CompletionError::Upstream { status, message } => {
                ApplicationError::RequestRejected(format!("HTTP {status}: {message}"))
            },
            CompletionError::EmptyResponse => ApplicationError::EmptyReply,
            CompletionError::ConnectionFailed(e) => {
                ApplicationError::Internal(format!("Completion service unreachable: {e}"))
            },
            CompletionError::InvalidResponse(e) => {
                ApplicationError::Internal(format!("Invalid response: {e}"))
            },
        }
    }
}

#[async_trait]
impl CompletionPort for CompletionAdapter {
    fn is_configured(&self) -> bool {
        self.engine.is_configured()
    }

    fn model(&self) -> String {
        self.engine.model().to_string()
    }

    #[instrument(skip(self, query), fields(query_len = query.char_count(), %locale))]
    async fn answer(
        &self,
        query: &Query,
        locale: Locale,
    ) -> Result<CompletionResult, ApplicationError> {
        let completion = self.engine.answer(query, locale).await.map_err(|e| {
            warn!(error = %e, "Completion failed");
            Self::map_error(e)
        })?;

        debug!(
            model = %completion.model,
            latency_ms = completion.latency_ms,
            "Completion received"
        );

        Ok(CompletionResult {
            content: completion.content,
            model: completion.model,
            latency_ms: completion.latency_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use domain::FailureKind;

    use super::*;

    #[test]
    fn upstream_status_splits_on_500() {
        let server = CompletionAdapter::map_error(CompletionError::Upstream {
            status: 503,
            message: "overloaded".into(),
        });
        assert!(matches!(server, ApplicationError::UpstreamUnavailable(_)));

        let client = CompletionAdapter::map_error(CompletionError::Upstream {
            status: 429,
            message: "rate limited".into(),
        });
        assert!(matches!(client, ApplicationError::RequestRejected(_)));
    }

    #[test]
    fn missing_key_is_configuration_error() {
        assert!(matches!(
            CompletionAdapter::map_error(CompletionError::MissingApiKey),
            ApplicationError::Configuration(_)
        ));
    }

    #[test]
    fn empty_and_timeout_map_directly() {
        assert_eq!(
            CompletionAdapter::map_error(CompletionError::EmptyResponse).kind(),
            FailureKind::EmptyReply
        );
        assert!(matches!(
            CompletionAdapter::map_error(CompletionError::Timeout(25_000)),
            ApplicationError::Timeout(25_000)
        ));
    }

    #[test]
    fn unparseable_upstream_is_internal() {
        assert!(matches!(
            CompletionAdapter::map_error(CompletionError::InvalidResponse("eof".into())),
            ApplicationError::Internal(_)
        ));
    }

    #[test]
    fn reports_configuration_and_model() {
        let adapter = CompletionAdapter::new(CompletionConfig::default()).unwrap();
        assert!(!adapter.is_configured());
        assert_eq!(adapter.model(), CompletionConfig::default().model);

        let adapter =
            CompletionAdapter::new(CompletionConfig::default().with_api_key("test-key")).unwrap();
        assert!(adapter.is_configured());
    }
}
