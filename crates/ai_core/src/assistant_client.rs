//! Client for the backend voice endpoint
//!
//! One `ask` is one POST: no retries, bounded by the configured timeout.
//! Input is validated before anything goes on the wire.

use std::time::Duration;

use domain::{Locale, Query};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::AssistantConfig;
use crate::error::AssistantError;

/// Successful answer of the voice endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceReply {
    /// Reply text, trimmed and non-empty
    pub response: String,
    /// Locale the backend answered in
    pub language: Locale,
    /// Model reported by the backend
    pub model_used: Option<String>,
}

#[derive(Debug, Serialize)]
struct VoiceRequest<'a> {
    query: &'a str,
    language: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoiceResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    model_used: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for `POST /api/voice`
#[derive(Debug, Clone)]
pub struct AssistantClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl AssistantClient {
    /// Create a new client
    pub fn new(config: &AssistantConfig) -> Result<Self, AssistantError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssistantError::Client(e.to_string()))?;

        info!(
            endpoint = %config.endpoint(),
            timeout_ms = config.timeout_ms,
            "Initialized assistant client"
        );

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            timeout,
        })
    }

    /// Ask `query` in the locale with code `locale` and return the reply text
    pub async fn ask(&self, query: &str, locale: &str) -> Result<String, AssistantError> {
        self.ask_detailed(query, locale)
            .await
            .map(|reply| reply.response)
    }

    /// Like [`Self::ask`], keeping the metadata of the answer
    #[instrument(skip(self, query), fields(query_len = query.chars().count()))]
    pub async fn ask_detailed(
        &self,
        query: &str,
        locale: &str,
    ) -> Result<VoiceReply, AssistantError> {
        let query = Query::parse(query).map_err(|e| AssistantError::InvalidInput(e.to_string()))?;
        let locale =
            Locale::from_code(locale).map_err(|e| AssistantError::InvalidInput(e.to_string()))?;

        let request = self.client.post(&self.endpoint).json(&VoiceRequest {
            query: query.as_str(),
            language: locale.code(),
        });

        debug!("Sending voice query");

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = match tokio::time::timeout(self.timeout, exchange).await {
            Err(_) => return Err(self.timed_out()),
            Ok(Err(e)) if e.is_timeout() => return Err(self.timed_out()),
            Ok(Err(e)) => {
                warn!(error = %e, "Voice endpoint unreachable");
                return Err(AssistantError::UpstreamUnavailable {
                    status: None,
                    message: e.to_string(),
                });
            },
            Ok(Ok(outcome)) => outcome,
        };

        if !status.is_success() {
            return Err(Self::classify_failure(status, &body));
        }

        let parsed: VoiceResponse = serde_json::from_str(&body).unwrap_or_else(|e| {
            warn!(error = %e, "Voice endpoint returned an unreadable body");
            VoiceResponse::default()
        });

        let response = parsed
            .response
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(AssistantError::EmptyReply)?;

        let language = parsed
            .language
            .as_deref()
            .and_then(|code| Locale::from_code(code).ok())
            .unwrap_or(locale);

        info!(%language, reply_len = response.chars().count(), "Voice query answered");

        Ok(VoiceReply {
            response,
            language,
            model_used: parsed.model_used,
        })
    }

    fn timed_out(&self) -> AssistantError {
        let ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        warn!(timeout_ms = ms, "Voice query timed out");
        AssistantError::Timeout(ms)
    }

    fn classify_failure(status: StatusCode, body: &str) -> AssistantError {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| body.to_string());

        warn!(status = %status, message = %message, "Voice endpoint returned an error");

        if status.is_server_error() {
            AssistantError::UpstreamUnavailable {
                status: Some(status.as_u16()),
                message,
            }
        } else {
            AssistantError::RequestRejected {
                status: status.as_u16(),
                message,
            }
        }
    }
}
