//! AI Speech - Speech capture and playback for voice sessions
//!
//! Wraps a speech-to-text and a text-to-speech capability behind the narrow
//! adapters a voice session talks to:
//! - [`SpeechCaptureAdapter`] - start/stop capture, interim and final text,
//!   "no speech" flush on stop, deterministic microphone release
//! - [`SpeechPlaybackAdapter`] - speak/cancel with locale voice selection,
//!   at most one utterance at a time
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the capability engines ([`RecognitionEngine`],
//!   [`SynthesisEngine`])
//! - `providers` module contains concrete engines
//!
//! # Supported Engines
//!
//! - [`LineRecognitionEngine`] - text lines stand in for recognized speech
//! - [`CommandSynthesisEngine`] - a local TTS program such as `espeak-ng`

pub mod capture;
pub mod config;
pub mod error;
pub mod playback;
pub mod ports;
pub mod providers;
pub mod types;

pub use capture::SpeechCaptureAdapter;
pub use config::SpeechConfig;
pub use error::SpeechError;
pub use playback::SpeechPlaybackAdapter;
pub use ports::{RecognitionEngine, RecognitionSink, SynthesisEngine, SynthesisSink};
pub use providers::{CommandSynthesisEngine, LineRecognitionEngine};
pub use types::{
    RecognitionAlternative, RecognitionEvent, RecognitionOptions, RecognitionResult,
    SynthesisEvent, Utterance, UtteranceId, VoiceInfo,
};
