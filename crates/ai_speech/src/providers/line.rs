//! Text-line recognition engine
//!
//! Lines of text stand in for recognized speech: whoever owns the engine
//! (a terminal front end, a test) feeds what the user "said" while a span is
//! active.

use parking_lot::Mutex;
use tracing::debug;

use crate::error::SpeechError;
use crate::ports::{RecognitionEngine, RecognitionSink};
use crate::types::{RecognitionEvent, RecognitionOptions, RecognitionResult};

struct ActiveSpan {
    options: RecognitionOptions,
    sink: RecognitionSink,
}

/// Recognition engine fed with text lines
pub struct LineRecognitionEngine {
    available: bool,
    active: Mutex<Option<ActiveSpan>>,
}

impl std::fmt::Debug for LineRecognitionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineRecognitionEngine")
            .field("available", &self.available)
            .field("listening", &self.listening_lang())
            .finish()
    }
}

impl Default for LineRecognitionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LineRecognitionEngine {
    pub fn new() -> Self {
        Self {
            available: true,
            active: Mutex::new(None),
        }
    }

    /// An engine that reports recognition as unsupported
    pub fn unavailable() -> Self {
        Self {
            available: false,
            active: Mutex::new(None),
        }
    }

    /// Whether a span is active
    pub fn is_listening(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Language tag of the active span
    pub fn listening_lang(&self) -> Option<String> {
        self.active.lock().as_ref().map(|s| s.options.lang.clone())
    }

    /// Report an interim hypothesis. Returns false when no span is active.
    pub fn hear_partial(&self, text: &str) -> bool {
        let Some(sink) = self.active.lock().as_ref().map(|s| s.sink.clone()) else {
            return false;
        };
        sink(RecognitionEvent::Result(vec![RecognitionResult::single(
            text, false,
        )]));
        true
    }

    /// Report a final result. A non-continuous span ends right after it.
    /// Returns false when no span is active.
    pub fn hear(&self, text: &str) -> bool {
        let (sink, ends) = {
            let mut active = self.active.lock();
            let Some(span) = active.as_ref() else {
                return false;
            };
            let sink = span.sink.clone();
            let ends = !span.options.continuous;
            if ends {
                *active = None;
            }
            (sink, ends)
        };

        sink(RecognitionEvent::Result(vec![RecognitionResult::single(
            text, true,
        )]));
        if ends {
            sink(RecognitionEvent::End);
        }
        true
    }

    /// Report an engine error code and end the span
    pub fn fail(&self, code: &str) -> bool {
        let Some(span) = self.active.lock().take() else {
            return false;
        };
        (span.sink)(RecognitionEvent::Error(code.to_string()));
        (span.sink)(RecognitionEvent::End);
        true
    }
}

impl RecognitionEngine for LineRecognitionEngine {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start(&self, options: RecognitionOptions, sink: RecognitionSink) -> Result<(), SpeechError> {
        if !self.available {
            return Err(SpeechError::NotAvailable(
                "line recognition disabled".to_string(),
            ));
        }

        {
            let mut active = self.active.lock();
            if active.is_some() {
                return Err(SpeechError::RecognitionFailed(
                    "a span is already active".to_string(),
                ));
            }
            debug!(lang = %options.lang, continuous = options.continuous, "Line recognition started");
            *active = Some(ActiveSpan {
                options,
                sink: sink.clone(),
            });
        }

        sink(RecognitionEvent::Start);
        Ok(())
    }

    fn stop(&self) {
        if let Some(span) = self.active.lock().take() {
            (span.sink)(RecognitionEvent::End);
        }
    }

    fn abort(&self) {
        if let Some(span) = self.active.lock().take() {
            (span.sink)(RecognitionEvent::Error("aborted".to_string()));
            (span.sink)(RecognitionEvent::End);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use domain::Locale;

    use super::*;

    fn recording_sink() -> (RecognitionSink, Arc<Mutex<Vec<RecognitionEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&events);
        let sink: RecognitionSink = Arc::new(move |event| captured.lock().push(event));
        (sink, events)
    }

    #[test]
    fn single_shot_span_ends_after_final() {
        let engine = LineRecognitionEngine::new();
        let (sink, events) = recording_sink();
        engine
            .start(RecognitionOptions::for_locale(Locale::En, false), sink)
            .unwrap();

        assert!(engine.hear("hello"));
        assert!(!engine.is_listening());
        assert_eq!(
            *events.lock(),
            vec![
                RecognitionEvent::Start,
                RecognitionEvent::Result(vec![RecognitionResult::single("hello", true)]),
                RecognitionEvent::End,
            ]
        );
    }

    #[test]
    fn continuous_span_keeps_listening() {
        let engine = LineRecognitionEngine::new();
        let (sink, _events) = recording_sink();
        engine
            .start(RecognitionOptions::for_locale(Locale::Hi, true), sink)
            .unwrap();

        assert!(engine.hear("one"));
        assert!(engine.hear("two"));
        assert!(engine.is_listening());
    }

    #[test]
    fn second_start_is_refused() {
        let engine = LineRecognitionEngine::new();
        let (sink, _events) = recording_sink();
        let options = RecognitionOptions::for_locale(Locale::En, false);
        engine.start(options.clone(), Arc::clone(&sink)).unwrap();
        assert!(matches!(
            engine.start(options, sink),
            Err(SpeechError::RecognitionFailed(_))
        ));
    }

    #[test]
    fn abort_reports_aborted() {
        let engine = LineRecognitionEngine::new();
        let (sink, events) = recording_sink();
        engine
            .start(RecognitionOptions::for_locale(Locale::En, true), sink)
            .unwrap();
        engine.abort();

        assert!(events
            .lock()
            .contains(&RecognitionEvent::Error("aborted".to_string())));
        assert!(!engine.hear("late"));
        assert!(!engine.hear_partial("late"));
    }

    #[test]
    fn unavailable_engine_refuses_start() {
        let engine = LineRecognitionEngine::unavailable();
        let (sink, _events) = recording_sink();
        assert!(!engine.is_available());
        assert!(matches!(
            engine.start(RecognitionOptions::for_locale(Locale::En, false), sink),
            Err(SpeechError::NotAvailable(_))
        ));
    }
}
