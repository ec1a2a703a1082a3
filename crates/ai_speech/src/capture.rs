//! Speech capture adapter
//!
//! Turns a [`RecognitionEngine`] into the start/stop/event contract a voice
//! session relies on. Engine events are translated as they arrive and queued
//! until the session pulls them with [`SpeechCaptureAdapter::next_event`].
//!
//! Each span gets its own sink; anything an engine reports for an older
//! span, or after the span was stopped or aborted, is dropped.

use std::{collections::VecDeque, fmt, sync::Arc};

use domain::{CaptureErrorKind, CaptureEvent, Locale};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, info, trace, warn};

use crate::ports::{RecognitionEngine, RecognitionSink};
use crate::types::{RecognitionEvent, RecognitionOptions, RecognitionResult};

#[derive(Debug, Default)]
struct CaptureState {
    span: u64,
    capturing: bool,
    /// Latest interim hypothesis of the span
    interim: String,
    heard_final: bool,
    queue: VecDeque<CaptureEvent>,
    closed: bool,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<CaptureState>,
    notify: Notify,
}

impl Shared {
    fn deliver(&self, span: u64, event: RecognitionEvent) {
        let mut state = self.state.lock();
        if state.closed || !state.capturing || state.span != span {
            trace!(span, ?event, "Dropping recognition event of a closed span");
            return;
        }

        match event {
            RecognitionEvent::Start => state.queue.push_back(CaptureEvent::Started),
            RecognitionEvent::Result(results) => Self::translate_results(&mut state, &results),
            RecognitionEvent::Error(code) => {
                let kind = CaptureErrorKind::from_code(&code);
                if kind != CaptureErrorKind::Aborted {
                    warn!(%code, "Recognition error");
                }
                state.queue.push_back(CaptureEvent::Error(kind));
            },
            RecognitionEvent::End => {
                debug!(span, "Recognition span ended");
                state.capturing = false;
                state.interim.clear();
                state.queue.push_back(CaptureEvent::Ended);
            },
        }

        drop(state);
        self.notify.notify_one();
    }

    fn translate_results(state: &mut CaptureState, results: &[RecognitionResult]) {
        let mut interim = String::new();
        for result in results {
            let Some(text) = result.best().map(str::trim).filter(|t| !t.is_empty()) else {
                continue;
            };
            if result.is_final {
                state.heard_final = true;
                state.queue.push_back(CaptureEvent::Final(text.to_string()));
            } else {
                if !interim.is_empty() {
                    interim.push(' ');
                }
                interim.push_str(text);
            }
        }

        if interim != state.interim {
            state.interim = interim;
            if !state.interim.is_empty() {
                state.queue.push_back(CaptureEvent::Interim(state.interim.clone()));
            }
        }
    }
}

/// Microphone capture with streaming recognition
pub struct SpeechCaptureAdapter {
    engine: Arc<dyn RecognitionEngine>,
    shared: Arc<Shared>,
}

impl fmt::Debug for SpeechCaptureAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechCaptureAdapter")
            .field("state", &*self.shared.state.lock())
            .finish_non_exhaustive()
    }
}

impl SpeechCaptureAdapter {
    pub fn new(engine: Arc<dyn RecognitionEngine>) -> Self {
        Self {
            engine,
            shared: Arc::new(Shared::default()),
        }
    }

    /// True iff the engine offers recognition
    pub fn is_supported(&self) -> bool {
        self.engine.is_available()
    }

    /// Whether the microphone is currently held
    pub fn is_capturing(&self) -> bool {
        self.shared.state.lock().capturing
    }

    /// Begin capture in `locale`.
    ///
    /// Returns events caused synchronously: `Error(Unsupported)` without a
    /// recognizer, the start failure if the engine refused. Starting while
    /// already capturing does nothing.
    pub fn start(&self, locale: Locale, continuous: bool) -> Vec<CaptureEvent> {
        if !self.engine.is_available() {
            warn!("Speech recognition not supported");
            return vec![CaptureEvent::Error(CaptureErrorKind::Unsupported)];
        }

        let span = {
            let mut state = self.shared.state.lock();
            if state.closed {
                debug!("Capture adapter torn down, ignoring start");
                return Vec::new();
            }
            if state.capturing {
                debug!("Already capturing, ignoring start");
                return Vec::new();
            }
            state.span += 1;
            state.capturing = true;
            state.interim.clear();
            state.heard_final = false;
            state.queue.clear();
            state.span
        };

        let shared = Arc::clone(&self.shared);
        let sink: RecognitionSink = Arc::new(move |event| shared.deliver(span, event));
        let options = RecognitionOptions::for_locale(locale, continuous);

        match self.engine.start(options, sink) {
            Ok(()) => {
                info!(span, %locale, continuous, "Speech capture started");
                Vec::new()
            },
            Err(e) => {
                warn!(error = %e, "Failed to start speech capture");
                let mut state = self.shared.state.lock();
                if state.span == span {
                    state.capturing = false;
                    state.queue.clear();
                }
                vec![CaptureEvent::Error(e.capture_kind())]
            },
        }
    }

    /// End capture and flush the span.
    ///
    /// Returns every event not yet pulled, then `Final` with the pending
    /// interim text (or `NoSpeech` when the span recognized nothing) and
    /// `Ended`. Releases the microphone.
    pub fn stop(&self) -> Vec<CaptureEvent> {
        let (events, was_capturing) = {
            let mut state = self.shared.state.lock();
            let mut events: Vec<CaptureEvent> = state.queue.drain(..).collect();
            let was_capturing = state.capturing;

            if was_capturing {
                state.capturing = false;
                let interim = std::mem::take(&mut state.interim);
                if !interim.is_empty() {
                    events.push(CaptureEvent::Final(interim));
                } else if !state.heard_final {
                    events.push(CaptureEvent::NoSpeech);
                }
                events.push(CaptureEvent::Ended);
            }
            (events, was_capturing)
        };

        if was_capturing {
            self.engine.stop();
            info!("Speech capture stopped");
        }
        events
    }

    /// Abort capture and drop the pending transcript. Releases the microphone.
    pub fn abort(&self) {
        let was_capturing = {
            let mut state = self.shared.state.lock();
            let was = state.capturing;
            state.capturing = false;
            state.interim.clear();
            state.queue.clear();
            was
        };

        if was_capturing {
            self.engine.abort();
            info!("Speech capture aborted");
        }
    }

    /// Visibility of the host changed. Hiding always releases the microphone.
    pub fn visibility_changed(&self, hidden: bool) {
        if hidden {
            debug!("Host hidden, aborting capture");
            self.abort();
        }
    }

    /// Release everything; [`Self::next_event`] returns `None` afterwards
    pub fn teardown(&self) {
        self.abort();
        self.shared.state.lock().closed = true;
        self.shared.notify.notify_one();
        debug!("Capture adapter torn down");
    }

    /// Next translated event, `None` once torn down
    pub async fn next_event(&self) -> Option<CaptureEvent> {
        loop {
            let notified = self.shared.notify.notified();
            {
                let mut state = self.shared.state.lock();
                if let Some(event) = state.queue.pop_front() {
                    return Some(event);
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::LineRecognitionEngine;

    fn adapter() -> (Arc<LineRecognitionEngine>, SpeechCaptureAdapter) {
        let engine = Arc::new(LineRecognitionEngine::new());
        let adapter = SpeechCaptureAdapter::new(Arc::clone(&engine) as Arc<dyn RecognitionEngine>);
        (engine, adapter)
    }

    fn drain(adapter: &SpeechCaptureAdapter) -> Vec<CaptureEvent> {
        adapter.shared.state.lock().queue.drain(..).collect()
    }

    #[test]
    fn unsupported_engine_signals_error() {
        let adapter = SpeechCaptureAdapter::new(Arc::new(LineRecognitionEngine::unavailable()));
        assert!(!adapter.is_supported());
        assert_eq!(
            adapter.start(Locale::En, false),
            vec![CaptureEvent::Error(CaptureErrorKind::Unsupported)]
        );
        assert!(!adapter.is_capturing());
    }

    #[test]
    fn start_twice_is_noop() {
        let (engine, adapter) = adapter();
        assert!(adapter.start(Locale::Hi, false).is_empty());
        assert!(adapter.is_capturing());
        assert_eq!(engine.listening_lang().as_deref(), Some("hi-IN"));
        assert_eq!(drain(&adapter), vec![CaptureEvent::Started]);

        assert!(adapter.start(Locale::En, false).is_empty());
        assert_eq!(engine.listening_lang().as_deref(), Some("hi-IN"));
        assert!(drain(&adapter).is_empty());
    }

    #[test]
    fn stop_flushes_interim_as_final() {
        let (engine, adapter) = adapter();
        adapter.start(Locale::En, false);
        engine.hear_partial("what is");

        let events = adapter.stop();
        assert_eq!(
            events,
            vec![
                CaptureEvent::Started,
                CaptureEvent::Interim("what is".into()),
                CaptureEvent::Final("what is".into()),
                CaptureEvent::Ended,
            ]
        );
        assert!(!adapter.is_capturing());
        assert!(!engine.is_listening());
    }

    #[test]
    fn stop_without_speech_signals_no_speech() {
        let (_engine, adapter) = adapter();
        adapter.start(Locale::En, false);
        drain(&adapter);

        assert_eq!(adapter.stop(), vec![CaptureEvent::NoSpeech, CaptureEvent::Ended]);
    }

    #[test]
    fn stop_after_final_has_no_flush() {
        let (engine, adapter) = adapter();
        adapter.start(Locale::En, true);
        engine.hear("pm kisan");
        drain(&adapter);

        assert_eq!(adapter.stop(), vec![CaptureEvent::Ended]);
    }

    #[test]
    fn stop_when_idle_returns_pending_only() {
        let (engine, adapter) = adapter();
        adapter.start(Locale::En, false);
        engine.hear("ration card");

        // Span ended on its own before the stop was processed
        assert!(!adapter.is_capturing());
        assert_eq!(
            adapter.stop(),
            vec![
                CaptureEvent::Started,
                CaptureEvent::Final("ration card".into()),
                CaptureEvent::Ended,
            ]
        );
        assert!(adapter.stop().is_empty());
    }

    #[test]
    fn abort_discards_transcript_and_late_events() {
        let (engine, adapter) = adapter();
        adapter.start(Locale::En, true);
        engine.hear_partial("half a sen");

        adapter.abort();
        assert!(!adapter.is_capturing());
        assert!(!engine.is_listening());
        assert!(drain(&adapter).is_empty());

        // Nothing from the aborted span leaks into the next one
        assert!(!engine.hear("late"));
        adapter.start(Locale::En, false);
        assert_eq!(drain(&adapter), vec![CaptureEvent::Started]);
    }

    #[test]
    fn hidden_host_releases_microphone() {
        let (engine, adapter) = adapter();
        adapter.start(Locale::En, true);
        adapter.visibility_changed(false);
        assert!(adapter.is_capturing());

        adapter.visibility_changed(true);
        assert!(!adapter.is_capturing());
        assert!(!engine.is_listening());
    }

    #[test]
    fn engine_error_is_translated() {
        let (engine, adapter) = adapter();
        adapter.start(Locale::En, true);
        engine.fail("not-allowed");

        assert_eq!(
            drain(&adapter),
            vec![
                CaptureEvent::Started,
                CaptureEvent::Error(CaptureErrorKind::NotAllowed),
                CaptureEvent::Ended,
            ]
        );
        assert!(!adapter.is_capturing());
    }

    #[test]
    fn interim_results_are_joined() {
        let state = &mut CaptureState {
            capturing: true,
            ..Default::default()
        };
        Shared::translate_results(
            state,
            &[
                RecognitionResult::single("namaste", true),
                RecognitionResult::single("mujhe", false),
                RecognitionResult::single("ration", false),
            ],
        );
        assert_eq!(
            state.queue.drain(..).collect::<Vec<_>>(),
            vec![
                CaptureEvent::Final("namaste".into()),
                CaptureEvent::Interim("mujhe ration".into()),
            ]
        );
    }

    #[tokio::test]
    async fn next_event_waits_and_closes_on_teardown() {
        let (engine, adapter) = adapter();
        let adapter = Arc::new(adapter);
        adapter.start(Locale::En, false);
        assert_eq!(adapter.next_event().await, Some(CaptureEvent::Started));

        let reader = Arc::clone(&adapter);
        let pending = tokio::spawn(async move { reader.next_event().await });
        tokio::task::yield_now().await;
        engine.hear_partial("hello");
        assert_eq!(
            pending.await.unwrap(),
            Some(CaptureEvent::Interim("hello".into()))
        );

        adapter.teardown();
        assert!(!engine.is_listening());
        assert_eq!(adapter.next_event().await, None);
    }
}
