//! OpenAI-compatible chat-completion engine used behind the voice endpoint

use std::time::{Duration, Instant};

use domain::{Locale, Query};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::CompletionConfig;
use crate::error::CompletionError;
use crate::prompts;

/// One answered completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Reply text, trimmed and non-empty
    pub content: String,
    /// Model the request was sent to
    pub model: String,
    /// Wall-clock latency of the upstream call
    pub latency_ms: u64,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completion client with locale-specific system prompts
pub struct ChatCompletionEngine {
    client: Client,
    config: CompletionConfig,
    api_key: Option<SecretString>,
}

impl std::fmt::Debug for ChatCompletionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionEngine {
    /// Create a new engine. A missing API key is reported per request.
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| CompletionError::Client(e.to_string()))?;

        let api_key = config.api_key().map(|key| SecretString::from(key.to_string()));
        if api_key.is_none() {
            warn!("Completion API key not configured, voice queries will be refused");
        }

        info!(
            base_url = %config.base_url,
            model = %config.model,
            "Initialized chat-completion engine"
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Whether an API key is present
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Model every request is sent to
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn api_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn transport_error(&self, err: reqwest::Error) -> CompletionError {
        if err.is_timeout() {
            CompletionError::Timeout(self.config.timeout_ms)
        } else {
            CompletionError::from(err)
        }
    }

    /// Answer `query` in `locale`
    #[instrument(skip(self, query), fields(model = %self.config.model, query_len = query.char_count()))]
    pub async fn answer(&self, query: &Query, locale: Locale) -> Result<Completion, CompletionError> {
        let api_key = self.api_key.as_ref().ok_or(CompletionError::MissingApiKey)?;

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts::system_prompt(locale),
                },
                ChatMessage {
                    role: "user",
                    content: prompts::user_content(query, locale),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            stream: false,
        };

        debug!("Sending chat-completion request");
        let started = Instant::now();

        let call = async {
            let response = self
                .client
                .post(self.api_url())
                .bearer_auth(api_key.expose_secret())
                .json(&request)
                .send()
                .await
                .map_err(|e| self.transport_error(e))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "Chat-completion request failed");
                return Err(CompletionError::Upstream {
                    status: status.as_u16(),
                    message: body,
                });
            }

            response
                .json::<ChatResponse>()
                .await
                .map_err(|e| CompletionError::InvalidResponse(e.to_string()))
        };

        let timeout = Duration::from_millis(self.config.timeout_ms);
        let parsed = tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| CompletionError::Timeout(self.config.timeout_ms))??;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                warn!(%locale, "Empty completion for voice query");
                CompletionError::EmptyResponse
            })?;

        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(latency_ms, "Chat completion finished");

        Ok(Completion {
            content,
            model: self.config.model.clone(),
            latency_ms,
        })
    }
}
