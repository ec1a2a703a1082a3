//! Port definitions for speech engines
//!
//! Engines report what happens asynchronously through a sink handed to them
//! per span or utterance. A sink may be called from any thread, including
//! from inside the control call that caused the event.

use std::sync::Arc;

use crate::error::SpeechError;
use crate::types::{RecognitionEvent, RecognitionOptions, SynthesisEvent, Utterance, VoiceInfo};

/// Receiver of recognition events for one span
pub type RecognitionSink = Arc<dyn Fn(RecognitionEvent) + Send + Sync>;

/// Receiver of synthesis events
pub type SynthesisSink = Arc<dyn Fn(SynthesisEvent) + Send + Sync>;

/// Speech-to-text capability
pub trait RecognitionEngine: Send + Sync {
    /// Whether the runtime offers recognition at all
    fn is_available(&self) -> bool;

    /// Begin a recognition span and acquire the microphone
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if the span cannot start, for example because the
    /// microphone is unavailable or permission was denied.
    fn start(&self, options: RecognitionOptions, sink: RecognitionSink) -> Result<(), SpeechError>;

    /// End the span gracefully and release the microphone
    fn stop(&self);

    /// End the span, discard pending results and release the microphone
    fn abort(&self);
}

/// Text-to-speech capability
pub trait SynthesisEngine: Send + Sync {
    /// Whether the runtime offers synthesis at all
    fn is_available(&self) -> bool;

    /// Voices the engine can speak with
    fn voices(&self) -> Vec<VoiceInfo>;

    /// Start speaking `utterance`
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if playback cannot start.
    fn speak(&self, utterance: Utterance, sink: SynthesisSink) -> Result<(), SpeechError>;

    /// Stop whatever is playing. Safe when idle.
    fn cancel(&self);
}
