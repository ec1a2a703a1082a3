//! Assistant proxy service - Backend side of the voice endpoint
//!
//! Validates the incoming query and language, then forwards to the
//! chat-completion model.

use std::{fmt, sync::Arc};

use domain::{DomainError, Locale, Query};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{error::ApplicationError, ports::CompletionPort};

pub const EMPTY_QUERY_MESSAGE: &str = "Query must be a non-empty string";
pub const INVALID_LANGUAGE_MESSAGE: &str = "Language must be either 'en' or 'hi'";
pub const QUERY_TOO_LONG_MESSAGE: &str = "Query too long. Max 500 characters";

/// Successful proxy answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyAnswer {
    pub response: String,
    pub language: Locale,
    pub model_used: String,
}

/// Use case behind `POST /api/voice`
pub struct AssistantProxyService {
    completion: Arc<dyn CompletionPort>,
}

impl fmt::Debug for AssistantProxyService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantProxyService")
            .field("model", &self.completion.model())
            .finish_non_exhaustive()
    }
}

impl AssistantProxyService {
    pub fn new(completion: Arc<dyn CompletionPort>) -> Self {
        Self { completion }
    }

    /// Whether upstream credentials are present
    pub fn is_configured(&self) -> bool {
        self.completion.is_configured()
    }

    /// Validate a raw request and answer it.
    ///
    /// `query` is `None` when the request carried no string query;
    /// `language` defaults to English when absent.
    #[instrument(skip(self, query), fields(query_len = query.map(str::len)))]
    pub async fn answer(
        &self,
        query: Option<&str>,
        language: Option<&str>,
    ) -> Result<ProxyAnswer, ApplicationError> {
        if !self.completion.is_configured() {
            return Err(ApplicationError::Configuration(
                "completion API key is not set".to_string(),
            ));
        }

        let raw = query
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| ApplicationError::InvalidInput(EMPTY_QUERY_MESSAGE.to_string()))?;

        let locale = language
            .map_or(Ok(Locale::En), Locale::from_code)
            .map_err(|_| ApplicationError::InvalidInput(INVALID_LANGUAGE_MESSAGE.to_string()))?;

        let query = Query::parse(raw).map_err(|e| match e {
            DomainError::QueryTooLong { .. } => {
                ApplicationError::InvalidInput(QUERY_TOO_LONG_MESSAGE.to_string())
            },
            _ => ApplicationError::InvalidInput(EMPTY_QUERY_MESSAGE.to_string()),
        })?;

        let result = self.completion.answer(&query, locale).await?;

        info!(
            %locale,
            model = %result.model,
            latency_ms = result.latency_ms,
            "Voice query answered"
        );

        Ok(ProxyAnswer {
            response: result.content,
            language: locale,
            model_used: result.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{CompletionResult, MockCompletionPort};

    fn configured() -> MockCompletionPort {
        let mut mock = MockCompletionPort::new();
        mock.expect_is_configured().returning(|| true);
        mock.expect_model()
            .returning(|| "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo".to_string());
        mock
    }

    fn invalid_message(err: ApplicationError) -> String {
        match err {
            ApplicationError::InvalidInput(message) => message,
            other => unreachable!("expected InvalidInput, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn answers_valid_hindi_query() {
        let mut mock = configured();
        mock.expect_answer()
            .withf(|q, l| q.as_str() == "मुझे राशन कार्ड बनवाना है" && *l == Locale::Hi)
            .times(1)
            .returning(|_, _| {
                Ok(CompletionResult {
                    content: "राशन कार्ड के लिए...".to_string(),
                    model: "test-model".to_string(),
                    latency_ms: 12,
                })
            });

        let service = AssistantProxyService::new(Arc::new(mock));
        let answer = service
            .answer(Some("  मुझे राशन कार्ड बनवाना है "), Some("hi"))
            .await
            .unwrap();

        assert_eq!(answer.language, Locale::Hi);
        assert_eq!(answer.model_used, "test-model");
        assert_eq!(answer.response, "राशन कार्ड के लिए...");
    }

    #[tokio::test]
    async fn language_defaults_to_english() {
        let mut mock = configured();
        mock.expect_answer()
            .withf(|_, l| *l == Locale::En)
            .returning(|_, _| {
                Ok(CompletionResult {
                    content: "ok".to_string(),
                    model: "m".to_string(),
                    latency_ms: 1,
                })
            });

        let service = AssistantProxyService::new(Arc::new(mock));
        let answer = service.answer(Some("hello"), None).await.unwrap();
        assert_eq!(answer.language, Locale::En);
    }

    #[tokio::test]
    async fn missing_credentials_fail_first() {
        let mut mock = MockCompletionPort::new();
        mock.expect_is_configured().returning(|| false);
        mock.expect_answer().never();

        let service = AssistantProxyService::new(Arc::new(mock));
        let err = service.answer(None, Some("fr")).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Configuration(_)));
    }

    #[tokio::test]
    async fn validation_order_and_messages() {
        let mut mock = configured();
        mock.expect_answer().never();
        let service = AssistantProxyService::new(Arc::new(mock));

        let err = service.answer(None, Some("en")).await.unwrap_err();
        assert_eq!(invalid_message(err), EMPTY_QUERY_MESSAGE);

        let err = service.answer(Some("   "), Some("fr")).await.unwrap_err();
        assert_eq!(invalid_message(err), EMPTY_QUERY_MESSAGE);

        let err = service.answer(Some("hello"), Some("fr")).await.unwrap_err();
        assert_eq!(invalid_message(err), INVALID_LANGUAGE_MESSAGE);

        let long = "a".repeat(501);
        let err = service.answer(Some(&long), Some("fr")).await.unwrap_err();
        assert_eq!(invalid_message(err), INVALID_LANGUAGE_MESSAGE);

        let err = service.answer(Some(&long), Some("en")).await.unwrap_err();
        assert_eq!(invalid_message(err), QUERY_TOO_LONG_MESSAGE);
    }

    #[tokio::test]
    async fn upstream_errors_propagate() {
        let mut mock = configured();
        mock.expect_answer()
            .returning(|_, _| Err(ApplicationError::Timeout(25_000)));

        let service = AssistantProxyService::new(Arc::new(mock));
        let err = service.answer(Some("hello"), Some("en")).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Timeout(25_000)));
    }
}
