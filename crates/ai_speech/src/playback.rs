//! Speech playback adapter
//!
//! At most one utterance plays at a time: `speak` cancels the utterance in
//! flight before starting the next one, and events of canceled utterances
//! never reach the session.

use std::{collections::VecDeque, fmt, sync::Arc};

use domain::{Locale, PlaybackErrorKind, PlaybackEvent};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, info, instrument, trace, warn};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::{SynthesisEngine, SynthesisSink};
use crate::types::{SynthesisEvent, Utterance, UtteranceId, VoiceInfo};

#[derive(Debug, Default)]
struct PlaybackState {
    next_id: u64,
    current: Option<UtteranceId>,
    queue: VecDeque<PlaybackEvent>,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<PlaybackState>,
    notify: Notify,
}

impl Shared {
    fn deliver(&self, event: SynthesisEvent) {
        let mut state = self.state.lock();
        if state.current != Some(event.utterance()) {
            trace!(?event, "Dropping event of a canceled utterance");
            return;
        }

        let translated = match event {
            SynthesisEvent::Start(_) => PlaybackEvent::Started,
            SynthesisEvent::End(_) => {
                state.current = None;
                PlaybackEvent::Ended
            },
            SynthesisEvent::Error(id, code) => {
                state.current = None;
                let kind = PlaybackErrorKind::from_code(&code);
                if !kind.is_preemption() {
                    warn!(utterance = %id, %code, "Synthesis error");
                }
                PlaybackEvent::Error(kind)
            },
        };
        state.queue.push_back(translated);

        drop(state);
        self.notify.notify_one();
    }
}

/// Speech output with locale-aware voice selection
pub struct SpeechPlaybackAdapter {
    engine: Arc<dyn SynthesisEngine>,
    rate: f32,
    pitch: f32,
    volume: f32,
    shared: Arc<Shared>,
}

impl fmt::Debug for SpeechPlaybackAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechPlaybackAdapter")
            .field("rate", &self.rate)
            .field("pitch", &self.pitch)
            .field("volume", &self.volume)
            .field("state", &*self.shared.state.lock())
            .finish_non_exhaustive()
    }
}

/// Pick the voice for `locale`: exact tag, then same language, then the
/// engine default
pub fn select_voice(voices: &[VoiceInfo], locale: Locale) -> Option<VoiceInfo> {
    voices
        .iter()
        .find(|v| v.lang.eq_ignore_ascii_case(locale.speech_tag()))
        .or_else(|| voices.iter().find(|v| locale.matches_voice_lang(&v.lang)))
        .or_else(|| voices.iter().find(|v| v.is_default))
        .cloned()
}

impl SpeechPlaybackAdapter {
    pub fn new(engine: Arc<dyn SynthesisEngine>, config: &SpeechConfig) -> Self {
        Self {
            engine,
            rate: config.rate,
            pitch: config.pitch,
            volume: config.volume,
            shared: Arc::new(Shared::default()),
        }
    }

    /// True iff the engine offers synthesis
    pub fn is_supported(&self) -> bool {
        self.engine.is_available()
    }

    /// Whether an utterance is in flight
    pub fn is_speaking(&self) -> bool {
        self.shared.state.lock().current.is_some()
    }

    /// Speak `text` with a voice matching `locale`, canceling whatever plays
    #[instrument(skip(self, text), fields(text_len = text.chars().count()))]
    pub fn speak(&self, text: &str, locale: Locale) -> Result<UtteranceId, SpeechError> {
        if !self.engine.is_available() {
            return Err(SpeechError::NotAvailable(
                "speech synthesis not supported".to_string(),
            ));
        }
        if text.trim().is_empty() {
            return Err(SpeechError::SynthesisFailed(
                "Cannot synthesize empty text".to_string(),
            ));
        }

        self.cancel();

        let voice = select_voice(&self.engine.voices(), locale);
        if voice.is_none() {
            debug!(%locale, "No matching voice, using engine default");
        }

        let id = {
            let mut state = self.shared.state.lock();
            state.next_id += 1;
            let id = UtteranceId::new(state.next_id);
            state.current = Some(id);
            id
        };

        let utterance = Utterance {
            id,
            text: text.to_string(),
            lang: locale.speech_tag().to_string(),
            voice,
            rate: self.rate,
            pitch: self.pitch,
            volume: self.volume,
        };

        let shared = Arc::clone(&self.shared);
        let sink: SynthesisSink = Arc::new(move |event| shared.deliver(event));

        if let Err(e) = self.engine.speak(utterance, sink) {
            let mut state = self.shared.state.lock();
            if state.current == Some(id) {
                state.current = None;
            }
            return Err(e);
        }

        info!(utterance = %id, %locale, "Playback started");
        Ok(id)
    }

    /// Stop playback immediately. Safe when idle.
    pub fn cancel(&self) {
        let previous = {
            let mut state = self.shared.state.lock();
            state.queue.clear();
            state.current.take()
        };

        if let Some(id) = previous {
            debug!(utterance = %id, "Canceling playback");
            self.engine.cancel();
        }
    }

    /// Next event of the current utterance
    pub async fn next_event(&self) -> Option<PlaybackEvent> {
        loop {
            let notified = self.shared.notify.notified();
            if let Some(event) = self.shared.state.lock().queue.pop_front() {
                return Some(event);
            }
            notified.await;
        }
    }
}
