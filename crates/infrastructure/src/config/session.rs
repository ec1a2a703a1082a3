//! Voice session tunables.

use std::time::Duration;

use application::SessionConfig;
use serde::{Deserialize, Serialize};

/// Voice session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Hard bound on a listening span in milliseconds
    #[serde(default = "default_listen_timeout_ms")]
    pub listen_timeout_ms: u64,
}

const fn default_listen_timeout_ms() -> u64 {
    30_000
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            listen_timeout_ms: default_listen_timeout_ms(),
        }
    }
}

impl SessionSettings {
    /// State machine configuration; `continuous` comes from the speech section
    pub const fn session_config(&self, continuous: bool) -> SessionConfig {
        SessionConfig {
            listen_timeout: Duration::from_millis(self.listen_timeout_ms),
            continuous,
        }
    }
}
