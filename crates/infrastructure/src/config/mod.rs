//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `session`: Voice session tunables
//! - `storage`: History and settings storage
//!
//! The assistant, completion and speech sections reuse the configuration
//! types of `ai_core` and `ai_speech`.

mod server;
mod session;
mod storage;

use std::path::Path;

use ai_core::{AssistantConfig, CompletionConfig};
use ai_speech::SpeechConfig;
use application::SessionConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use server::ServerConfig;
pub use session::SessionSettings;
pub use storage::StorageConfig;

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "VOICE_BUDDY";

/// Environment variable consulted when no completion API key is configured
pub const API_KEY_FALLBACK_VAR: &str = "TOGETHER_API_KEY";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Backend voice endpoint used by the client
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Chat-completion upstream used by the server
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Speech capture and playback
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Voice session tunables
    #[serde(default)]
    pub session: SessionSettings,

    /// History and settings storage
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (optional) and environment
    ///
    /// Environment variables use the `VOICE_BUDDY` prefix and `__` as
    /// separator, e.g. `VOICE_BUDDY__SERVER__PORT=8080`.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Like [`Self::load`], reading `file` instead of `config.toml`
    pub fn load_from(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let builder = config::Config::builder()
            // Start with defaults
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            // Load from file if exists
            .add_source(file_source)
            // Override with environment variables
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.apply_api_key_fallback(std::env::var(API_KEY_FALLBACK_VAR).ok());
        config
            .speech
            .validate()
            .map_err(|e| config::ConfigError::Message(format!("speech: {e}")))?;
        Ok(config)
    }

    /// Use `fallback` as completion API key when none is configured
    pub fn apply_api_key_fallback(&mut self, fallback: Option<String>) {
        if self.completion.api_key().is_some() {
            return;
        }
        if let Some(key) = fallback.filter(|k| !k.trim().is_empty()) {
            debug!("Using completion API key from {API_KEY_FALLBACK_VAR}");
            self.completion = self.completion.clone().with_api_key(key);
        }
    }

    /// State machine configuration derived from the session and speech sections
    pub const fn session_config(&self) -> SessionConfig {
        self.session.session_config(self.speech.continuous)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.log_format, "text");
        assert_eq!(config.assistant.path, "/api/voice");
        assert_eq!(config.assistant.timeout_ms, 25_000);
        assert_eq!(config.completion.max_tokens, 300);
        assert_eq!(config.session.listen_timeout_ms, 30_000);
        assert_eq!(config.storage.history_key, "voice-history");
        assert_eq!(config.storage.settings_key, "voice-settings");
        assert_eq!(config.storage.history_cap, 50);
        assert!(!config.speech.continuous);
    }

    #[test]
    fn session_config_combines_sections() {
        let mut config = AppConfig::default();
        config.session.listen_timeout_ms = 5_000;
        config.speech.continuous = true;

        let session = config.session_config();
        assert_eq!(session.listen_timeout, Duration::from_secs(5));
        assert!(session.continuous);
    }

    #[test]
    fn fallback_key_only_fills_missing_key() {
        let mut config = AppConfig::default();
        config.apply_api_key_fallback(Some("from-env".to_string()));
        assert_eq!(config.completion.api_key(), Some("from-env"));

        config.apply_api_key_fallback(Some("other".to_string()));
        assert_eq!(config.completion.api_key(), Some("from-env"));

        let mut config = AppConfig::default();
        config.apply_api_key_fallback(Some("   ".to_string()));
        assert_eq!(config.completion.api_key(), None);
    }

    #[test]
    fn partial_toml_fills_remaining_defaults() {
        let toml = r#"
            [server]
            port = 8080

            [speech]
            continuous = true
            command = "say"

            [storage]
            persistent = false
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.speech.continuous);
        assert_eq!(config.speech.command, "say");
        assert!(!config.storage.persistent);
        assert_eq!(config.storage.history_cap, 50);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[session]\nlisten_timeout_ms = 1000\n\n[completion]\napi_key = \"file-key\"\nmodel = \"small\""
        )
        .unwrap();

        let config = AppConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.session.listen_timeout_ms, 1000);
        assert_eq!(config.completion.api_key(), Some("file-key"));
        assert_eq!(config.completion.model, "small");
    }

    #[test]
    fn invalid_speech_settings_are_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[speech]\nrate = 50.0").unwrap();

        assert!(AppConfig::load_from(Some(file.path())).is_err());
    }
}
