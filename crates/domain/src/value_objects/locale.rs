//! Interaction locale - selects the assistant prompt and the speech language

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Supported interaction languages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English
    #[default]
    En,
    /// Hindi
    Hi,
}

impl Locale {
    /// All supported locales
    pub const ALL: [Self; 2] = [Self::En, Self::Hi];

    /// Short language code used on the wire (`en`, `hi`)
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
        }
    }

    /// BCP 47 tag handed to speech engines
    #[must_use]
    pub const fn speech_tag(&self) -> &'static str {
        match self {
            Self::En => "en-US",
            Self::Hi => "hi-IN",
        }
    }

    /// Human readable name
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "हिंदी",
        }
    }

    /// Parse a wire code. Only the exact lowercase codes are accepted.
    pub fn from_code(code: &str) -> Result<Self, DomainError> {
        match code {
            "en" => Ok(Self::En),
            "hi" => Ok(Self::Hi),
            other => Err(DomainError::UnsupportedLocale(other.to_string())),
        }
    }

    /// Whether a voice language tag (`hi-IN`, `hi_IN`, `hi`) belongs to this locale
    #[must_use]
    pub fn matches_voice_lang(&self, lang: &str) -> bool {
        let primary = lang
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        primary == self.code()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_english() {
        assert_eq!(Locale::default(), Locale::En);
    }

    #[test]
    fn codes_and_tags() {
        assert_eq!(Locale::En.code(), "en");
        assert_eq!(Locale::Hi.code(), "hi");
        assert_eq!(Locale::En.speech_tag(), "en-US");
        assert_eq!(Locale::Hi.speech_tag(), "hi-IN");
    }

    #[test]
    fn from_code_accepts_supported() {
        assert_eq!(Locale::from_code("en").unwrap(), Locale::En);
        assert_eq!("hi".parse::<Locale>().unwrap(), Locale::Hi);
    }

    #[test]
    fn from_code_rejects_everything_else() {
        for bad in ["", "fr", "EN", " hi", "en-US"] {
            let err = Locale::from_code(bad).unwrap_err();
            assert_eq!(err, DomainError::UnsupportedLocale(bad.to_string()));
        }
    }

    #[test]
    fn voice_lang_matching_uses_primary_subtag() {
        assert!(Locale::Hi.matches_voice_lang("hi-IN"));
        assert!(Locale::Hi.matches_voice_lang("HI_in"));
        assert!(Locale::En.matches_voice_lang("en-GB"));
        assert!(!Locale::En.matches_voice_lang("hi-IN"));
        assert!(!Locale::En.matches_voice_lang(""));
    }

    #[test]
    fn serializes_as_lowercase_code() {
        assert_eq!(serde_json::to_string(&Locale::Hi).unwrap(), "\"hi\"");
        let parsed: Locale = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(parsed, Locale::En);
        assert!(serde_json::from_str::<Locale>("\"fr\"").is_err());
    }

    #[test]
    fn display_uses_code() {
        assert_eq!(Locale::Hi.to_string(), "hi");
    }
}
