//! Configuration for the assistant and completion clients

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Configuration for [`crate::AssistantClient`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Base URL of the backend serving the voice endpoint
    #[serde(default = "default_assistant_base_url")]
    pub base_url: String,

    /// Path of the voice endpoint
    #[serde(default = "default_assistant_path")]
    pub path: String,

    /// Hard bound on one request in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_assistant_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_assistant_path() -> String {
    "/api/voice".to_string()
}

const fn default_timeout_ms() -> u64 {
    25_000
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: default_assistant_base_url(),
            path: default_assistant_path(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AssistantConfig {
    /// Full URL of the voice endpoint
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

/// Configuration for [`crate::ChatCompletionEngine`]
#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,

    /// Bearer token (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Model used for every locale
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Upstream bound in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_completion_base_url() -> String {
    "https://api.together.xyz/v1".to_string()
}

fn default_model() -> String {
    "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo".to_string()
}

const fn default_max_tokens() -> u32 {
    300
}

const fn default_temperature() -> f32 {
    0.3
}

const fn default_top_p() -> f32 {
    0.7
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_completion_base_url(),
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl CompletionConfig {
    /// API key, if one is set and non-blank
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|key| !key.trim().is_empty())
    }

    /// Set the API key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_defaults() {
        let config = AssistantConfig::default();
        assert_eq!(config.timeout_ms, 25_000);
        assert_eq!(config.endpoint(), "http://localhost:3000/api/voice");
    }

    #[test]
    fn endpoint_joins_slashes_once() {
        let config = AssistantConfig {
            base_url: "http://example.test/".to_string(),
            path: "api/voice".to_string(),
            ..Default::default()
        };
        assert_eq!(config.endpoint(), "http://example.test/api/voice");
    }

    #[test]
    fn completion_defaults() {
        let config = CompletionConfig::default();
        assert_eq!(config.max_tokens, 300);
        assert!((config.temperature - 0.3).abs() < f32::EPSILON);
        assert!((config.top_p - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.timeout_ms, 25_000);
        assert!(config.api_key().is_none());
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = CompletionConfig::default().with_api_key("   ");
        assert!(config.api_key().is_none());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = CompletionConfig::default().with_api_key("sk-very-secret");
        let rendered = format!("{config:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("sk-very-secret"));
    }

    #[test]
    fn deserializes_partial_toml_like_json() {
        let config: CompletionConfig =
            serde_json::from_str(r#"{"api_key":"abc","model":"small"}"#).unwrap();
        assert_eq!(config.api_key(), Some("abc"));
        assert_eq!(config.model, "small");
        assert_eq!(config.max_tokens, 300);
    }
}
