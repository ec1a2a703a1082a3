//! Types exchanged with speech engines

use std::fmt;

use domain::Locale;
use serde::{Deserialize, Serialize};

/// Identity of one utterance handed to a synthesis engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtteranceId(u64);

impl UtteranceId {
    /// Create an id from a raw counter value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw counter value
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "utt-{}", self.0)
    }
}

/// Options for one recognition span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    /// BCP 47 language tag, e.g. `hi-IN`
    pub lang: String,
    /// Keep recognizing after a final result
    pub continuous: bool,
    /// Report interim hypotheses
    pub interim_results: bool,
}

impl RecognitionOptions {
    /// Options for `locale` with interim results enabled
    pub fn for_locale(locale: Locale, continuous: bool) -> Self {
        Self {
            lang: locale.speech_tag().to_string(),
            continuous,
            interim_results: true,
        }
    }
}

/// One hypothesis of a recognition result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionAlternative {
    pub transcript: String,
    /// Confidence between 0 and 1
    pub confidence: f32,
}

/// A recognition result with its alternatives, best first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub alternatives: Vec<RecognitionAlternative>,
    pub is_final: bool,
}

impl RecognitionResult {
    /// Single-alternative result
    pub fn single(transcript: impl Into<String>, is_final: bool) -> Self {
        Self {
            alternatives: vec![RecognitionAlternative {
                transcript: transcript.into(),
                confidence: 1.0,
            }],
            is_final,
        }
    }

    /// Transcript of the best alternative
    pub fn best(&self) -> Option<&str> {
        self.alternatives.first().map(|a| a.transcript.as_str())
    }
}

/// Events emitted by a recognition engine
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// Audio capture began
    Start,
    /// New or updated results of the current span
    Result(Vec<RecognitionResult>),
    /// Engine error, with the engine's error code
    Error(String),
    /// Audio capture ended
    End,
}

/// A voice offered by a synthesis engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    /// Engine-specific voice identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// BCP 47 language tag of the voice
    pub lang: String,
    /// Engine default voice
    #[serde(default)]
    pub is_default: bool,
}

impl VoiceInfo {
    /// Create a new voice
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lang: lang.into(),
            is_default: false,
        }
    }

    /// Mark as the engine default
    #[must_use]
    pub const fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// Text handed to a synthesis engine
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    /// BCP 47 language tag
    pub lang: String,
    /// Voice to use, `None` for the engine default
    pub voice: Option<VoiceInfo>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// Events emitted by a synthesis engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisEvent {
    Start(UtteranceId),
    End(UtteranceId),
    /// Engine error, with the engine's error code
    Error(UtteranceId, String),
}

impl SynthesisEvent {
    /// Utterance the event belongs to
    pub const fn utterance(&self) -> UtteranceId {
        match self {
            Self::Start(id) | Self::End(id) | Self::Error(id, _) => *id,
        }
    }
}
