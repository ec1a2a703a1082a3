//! Capture adapter - Implements SpeechCapturePort using the ai_speech capture adapter

use std::sync::Arc;

use ai_speech::{RecognitionEngine, SpeechCaptureAdapter, SpeechConfig};
use application::ports::SpeechCapturePort;
use async_trait::async_trait;
use domain::{CaptureErrorKind, CaptureEvent, Locale};
use tracing::debug;

/// Adapter for microphone capture
#[derive(Debug)]
pub struct CaptureAdapter {
    inner: SpeechCaptureAdapter,
    enabled: bool,
}

impl CaptureAdapter {
    /// Create an adapter over a recognition engine.
    /// `speech.capture_enabled = false` reports the capability as missing.
    pub fn new(engine: Arc<dyn RecognitionEngine>, config: &SpeechConfig) -> Self {
        if !config.capture_enabled {
            debug!("Speech capture disabled by configuration");
        }
        Self {
            inner: SpeechCaptureAdapter::new(engine),
            enabled: config.capture_enabled,
        }
    }

    /// Whether a capture span is active
    pub fn is_capturing(&self) -> bool {
        self.inner.is_capturing()
    }

    /// Report a host visibility change; hiding aborts capture
    pub fn visibility_changed(&self, hidden: bool) {
        self.inner.visibility_changed(hidden);
    }
}

#[async_trait]
impl SpeechCapturePort for CaptureAdapter {
    fn is_supported(&self) -> bool {
        self.enabled && self.inner.is_supported()
    }

    fn start(&self, locale: Locale, continuous: bool) -> Vec<CaptureEvent> {
        if !self.enabled {
            return vec![CaptureEvent::Error(CaptureErrorKind::Unsupported)];
        }
        self.inner.start(locale, continuous)
    }

    fn stop(&self) -> Vec<CaptureEvent> {
        self.inner.stop()
    }

    fn abort(&self) {
        self.inner.abort();
    }

    fn teardown(&self) {
        self.inner.teardown();
    }

    async fn next_event(&self) -> Option<CaptureEvent> {
        self.inner.next_event().await
    }
}
