//! Playback adapter - Implements SpeechPlaybackPort using the ai_speech playback adapter

use std::sync::Arc;

use ai_speech::{SpeechConfig, SpeechError, SpeechPlaybackAdapter, SynthesisEngine};
use application::error::ApplicationError;
use application::ports::SpeechPlaybackPort;
use async_trait::async_trait;
use domain::{Locale, PlaybackEvent};
use tracing::{debug, instrument};

/// Adapter for spoken replies
#[derive(Debug)]
pub struct PlaybackAdapter {
    inner: SpeechPlaybackAdapter,
    enabled: bool,
}

impl PlaybackAdapter {
    /// Create an adapter over a synthesis engine.
    /// `speech.playback_enabled = false` makes every reply text-only.
    pub fn new(engine: Arc<dyn SynthesisEngine>, config: &SpeechConfig) -> Self {
        if !config.playback_enabled {
            debug!("Speech playback disabled by configuration");
        }
        Self {
            inner: SpeechPlaybackAdapter::new(engine, config),
            enabled: config.playback_enabled,
        }
    }

    /// Whether an utterance is in flight
    pub fn is_speaking(&self) -> bool {
        self.inner.is_speaking()
    }

    /// Map speech error to application error
    fn map_error(err: SpeechError) -> ApplicationError {
        match err {
            SpeechError::NotAvailable(e) => ApplicationError::UnsupportedCapability(e),
            SpeechError::Configuration(e) => ApplicationError::Configuration(e),
            SpeechError::SynthesisFailed(e)
            | SpeechError::AudioDevice(e)
            | SpeechError::PermissionDenied(e)
            | SpeechError::RecognitionFailed(e) => ApplicationError::Playback(e),
        }
    }
}

#[async_trait]
impl SpeechPlaybackPort for PlaybackAdapter {
    fn is_supported(&self) -> bool {
        self.enabled && self.inner.is_supported()
    }

    #[instrument(skip(self, text), fields(%locale))]
    fn speak(&self, text: &str, locale: Locale) -> Result<(), ApplicationError> {
        if !self.enabled {
            return Err(ApplicationError::UnsupportedCapability(
                "speech playback disabled".to_string(),
            ));
        }
        self.inner
            .speak(text, locale)
            .map(|_| ())
            .map_err(Self::map_error)
    }

    fn cancel(&self) {
        self.inner.cancel();
    }

    async fn next_event(&self) -> Option<PlaybackEvent> {
        self.inner.next_event().await
    }
}
