//! Configuration for speech capture and playback

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Configuration for speech capture and playback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Keep recognizing after a final result instead of ending the span
    #[serde(default)]
    pub continuous: bool,

    /// Enable speech capture
    #[serde(default = "default_true")]
    pub capture_enabled: bool,

    /// Enable spoken replies
    #[serde(default = "default_true")]
    pub playback_enabled: bool,

    /// Speaking rate (0.1 to 10.0, 1.0 is normal)
    #[serde(default = "default_rate")]
    pub rate: f32,

    /// Voice pitch (0.0 to 2.0, 1.0 is normal)
    #[serde(default = "default_pitch")]
    pub pitch: f32,

    /// Output volume (0.0 to 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Synthesis program invoked per utterance
    #[serde(default = "default_command")]
    pub command: String,

    /// Program voice per language tag, e.g. `hi-IN = "hi"`
    #[serde(default = "default_voices")]
    pub voices: BTreeMap<String, String>,
}

const fn default_true() -> bool {
    true
}

const fn default_rate() -> f32 {
    0.9
}

const fn default_pitch() -> f32 {
    1.0
}

const fn default_volume() -> f32 {
    0.8
}

fn default_command() -> String {
    "espeak-ng".to_string()
}

fn default_voices() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("en-US".to_string(), "en-us".to_string()),
        ("hi-IN".to_string(), "hi".to_string()),
    ])
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            continuous: false,
            capture_enabled: true,
            playback_enabled: true,
            rate: default_rate(),
            pitch: default_pitch(),
            volume: default_volume(),
            command: default_command(),
            voices: default_voices(),
        }
    }
}

impl SpeechConfig {
    /// Validate value ranges
    pub fn validate(&self) -> Result<(), String> {
        if !(0.1..=10.0).contains(&self.rate) {
            return Err(format!("rate must be between 0.1 and 10.0, got {}", self.rate));
        }
        if !(0.0..=2.0).contains(&self.pitch) {
            return Err(format!("pitch must be between 0.0 and 2.0, got {}", self.pitch));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(format!("volume must be between 0.0 and 1.0, got {}", self.volume));
        }
        if self.command.trim().is_empty() {
            return Err("command must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SpeechConfig::default();
        assert!(!config.continuous);
        assert!((config.rate - 0.9).abs() < f32::EPSILON);
        assert!((config.pitch - 1.0).abs() < f32::EPSILON);
        assert!((config.volume - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.command, "espeak-ng");
        assert_eq!(config.voices.get("hi-IN").map(String::as_str), Some("hi"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn out_of_range_values_rejected() {
        let config = SpeechConfig {
            volume: 1.5,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("volume"));

        let config = SpeechConfig {
            rate: 0.0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("rate"));
    }

    #[test]
    fn deserializes_from_toml() {
        let config: SpeechConfig = toml::from_str(
            r#"
            continuous = true
            command = "/usr/bin/espeak"

            [voices]
            "en-IN" = "en-in"
            "#,
        )
        .unwrap();

        assert!(config.continuous);
        assert_eq!(config.command, "/usr/bin/espeak");
        assert_eq!(config.voices.len(), 1);
        assert!((config.rate - 0.9).abs() < f32::EPSILON);
    }
}
