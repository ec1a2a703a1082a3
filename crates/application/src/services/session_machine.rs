//! Voice session state machine
//!
//! A pure transition function: every discrete event is handled by
//! [`SessionMachine::handle`], which updates the session and returns the
//! effects the caller must carry out together with the states entered.
//! No I/O happens here; [`crate::services::VoiceSessionController`] drives it.

use std::time::Duration;

use domain::{
    CaptureEvent, FailureKind, Locale, PlaybackEvent, Query, SessionState, Transcript,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Hard bound on a listening span
pub const DEFAULT_LISTEN_TIMEOUT: Duration = Duration::from_secs(30);

/// Speech capabilities detected when the session is mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Speech-to-text available
    pub capture: bool,
    /// Text-to-speech available
    pub playback: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            capture: true,
            playback: true,
        }
    }
}

/// Tunables of the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Listening timeout armed on every start
    pub listen_timeout: Duration,
    /// Keep recognizing after a final result instead of ending the span
    pub continuous: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            listen_timeout: DEFAULT_LISTEN_TIMEOUT,
            continuous: false,
        }
    }
}

/// Discrete inputs of the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// User pressed start
    StartListening,
    /// User pressed stop
    StopListening,
    /// The listening timer of `cycle` fired
    ListenTimeout { cycle: u64 },
    /// Event pulled from the recognizer
    Capture(CaptureEvent),
    /// Events returned by the capture `stop` call
    CaptureStopped(Vec<CaptureEvent>),
    /// Assistant call of `cycle` completed
    AskFinished {
        cycle: u64,
        result: Result<String, FailureKind>,
    },
    /// Event of the current utterance
    Playback(PlaybackEvent),
    /// User asked to hear the visible reply again
    Replay,
    /// User silenced the current utterance
    StopSpeaking,
    /// User selected another locale
    LocaleChanged(Locale),
    /// Host page hidden or backgrounded
    PageHidden,
    /// Session unmounted
    Teardown,
}

/// Side effects requested by a transition, to be carried out in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartCapture { locale: Locale, continuous: bool },
    StopCapture,
    AbortCapture,
    ReleaseCapture,
    ArmListenTimer { cycle: u64, after: Duration },
    ClearListenTimer,
    Ask { cycle: u64, query: Query, locale: Locale },
    Record { query: Query, reply: String, locale: Locale },
    Speak { text: String, locale: Locale },
    CancelPlayback,
    PersistLocale(Locale),
}

/// Outcome of handling one event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Step {
    /// Effects to execute, in order
    pub effects: Vec<Effect>,
    /// Every state entered while handling the event, in order
    pub transitions: Vec<SessionState>,
    /// Failure raised by the event, if any
    pub failure: Option<FailureKind>,
}

impl Step {
    /// True when the event changed nothing
    pub fn is_noop(&self) -> bool {
        self.effects.is_empty() && self.transitions.is_empty() && self.failure.is_none()
    }
}

/// Observable view of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub locale: Locale,
    /// Committed text followed by the interim hypothesis
    pub transcript: String,
    /// Visible reply, or the localized message of the last failure
    pub reply: Option<String>,
    pub failure: Option<FailureKind>,
    pub capabilities: Capabilities,
}

/// The voice session state machine
#[derive(Debug)]
pub struct SessionMachine {
    state: SessionState,
    locale: Locale,
    capabilities: Capabilities,
    config: SessionConfig,
    transcript: Transcript,
    reply: Option<String>,
    failure: Option<FailureKind>,
    cycle: u64,
    stopping: bool,
    pending: Option<(Query, Locale)>,
    torn_down: bool,
}

impl SessionMachine {
    pub fn new(locale: Locale, capabilities: Capabilities, config: SessionConfig) -> Self {
        Self {
            state: SessionState::Idle,
            locale,
            capabilities,
            config,
            transcript: Transcript::new(),
            reply: None,
            failure: None,
            cycle: 0,
            stopping: false,
            pending: None,
            torn_down: false,
        }
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub const fn locale(&self) -> Locale {
        self.locale
    }

    pub const fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn reply(&self) -> Option<&str> {
        self.reply.as_deref()
    }

    /// Identifier of the current listen/submit cycle
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            locale: self.locale,
            transcript: self.transcript.text(),
            reply: self.reply.clone(),
            failure: self.failure,
            capabilities: self.capabilities,
        }
    }

    /// Apply one event
    pub fn handle(&mut self, event: SessionEvent) -> Step {
        let mut step = Step::default();
        if self.torn_down {
            debug!(?event, "Session torn down, ignoring event");
            return step;
        }

        match event {
            SessionEvent::StartListening => self.start_listening(&mut step),
            SessionEvent::StopListening => self.request_stop(&mut step),
            SessionEvent::ListenTimeout { cycle } => {
                if cycle == self.cycle {
                    debug!(cycle, "Listening timeout");
                    self.request_stop(&mut step);
                } else {
                    debug!(cycle, current = self.cycle, "Ignoring stale listening timeout");
                }
            },
            SessionEvent::Capture(event) => self.on_capture(&mut step, event),
            SessionEvent::CaptureStopped(events) => self.on_capture_stopped(&mut step, events),
            SessionEvent::AskFinished { cycle, result } => self.on_ask_finished(&mut step, cycle, result),
            SessionEvent::Playback(event) => self.on_playback(&mut step, event),
            SessionEvent::Replay => self.replay(&mut step),
            SessionEvent::StopSpeaking => {
                if self.state == SessionState::Speaking {
                    step.effects.push(Effect::CancelPlayback);
                    self.enter(&mut step, SessionState::Idle);
                }
            },
            SessionEvent::LocaleChanged(locale) => self.change_locale(&mut step, locale),
            SessionEvent::PageHidden => self.cancel_everything(&mut step, Effect::AbortCapture),
            SessionEvent::Teardown => {
                self.cancel_everything(&mut step, Effect::ReleaseCapture);
                self.torn_down = true;
            },
        }

        step
    }

    fn start_listening(&mut self, step: &mut Step) {
        if !self.state.is_idle() {
            debug!(state = %self.state, "Start ignored, session busy");
            return;
        }
        if !self.capabilities.capture {
            self.reply = None;
            self.fail(step, FailureKind::UnsupportedCapability, false);
            return;
        }

        self.cycle += 1;
        self.transcript.clear();
        self.reply = None;
        self.failure = None;
        self.stopping = false;
        self.pending = None;

        if self.capabilities.playback {
            step.effects.push(Effect::CancelPlayback);
        }
        step.effects.push(Effect::StartCapture {
            locale: self.locale,
            continuous: self.config.continuous,
        });
        step.effects.push(Effect::ArmListenTimer {
            cycle: self.cycle,
            after: self.config.listen_timeout,
        });
        self.enter(step, SessionState::Listening);
    }

    fn request_stop(&mut self, step: &mut Step) {
        if self.state != SessionState::Listening || self.stopping {
            debug!(state = %self.state, "Stop ignored");
            return;
        }
        self.stopping = true;
        step.effects.push(Effect::ClearListenTimer);
        step.effects.push(Effect::StopCapture);
    }

    fn on_capture(&mut self, step: &mut Step, event: CaptureEvent) {
        if self.state != SessionState::Listening {
            debug!(?event, state = %self.state, "Ignoring capture event");
            return;
        }

        match event {
            CaptureEvent::Started | CaptureEvent::NoSpeech => {},
            CaptureEvent::Interim(text) => {
                if !self.stopping {
                    self.transcript.set_interim(&text);
                }
            },
            CaptureEvent::Final(text) => self.transcript.push_final(&text),
            CaptureEvent::Error(kind) => {
                if let Some(failure) = kind.failure_kind() {
                    warn!(?kind, "Speech capture failed");
                    step.effects.push(Effect::ClearListenTimer);
                    step.effects.push(Effect::AbortCapture);
                    self.stopping = false;
                    self.fail(step, failure, false);
                }
            },
            CaptureEvent::Ended => {
                if !self.stopping {
                    debug!("Capture ended on its own, finalizing");
                    step.effects.push(Effect::ClearListenTimer);
                    self.finalize(step);
                }
            },
        }
    }

    fn on_capture_stopped(&mut self, step: &mut Step, events: Vec<CaptureEvent>) {
        if self.state != SessionState::Listening || !self.stopping {
            return;
        }
        for event in events {
            match event {
                CaptureEvent::Interim(text) => self.transcript.set_interim(&text),
                CaptureEvent::Final(text) => self.transcript.push_final(&text),
                _ => {},
            }
        }
        self.finalize(step);
    }

    fn finalize(&mut self, step: &mut Step) {
        self.stopping = false;
        self.transcript.commit_interim();
        let text = self.transcript.committed_text();

        if text.trim().is_empty() {
            self.fail(step, FailureKind::NoSpeechDetected, false);
            return;
        }

        match Query::parse(&text) {
            Ok(query) => {
                self.pending = Some((query.clone(), self.locale));
                step.effects.push(Effect::Ask {
                    cycle: self.cycle,
                    query,
                    locale: self.locale,
                });
                self.enter(step, SessionState::Submitting);
            },
            Err(e) => {
                warn!(error = %e, "Transcript rejected");
                self.fail(step, FailureKind::InvalidInput, false);
            },
        }
    }

    fn on_ask_finished(&mut self, step: &mut Step, cycle: u64, result: Result<String, FailureKind>) {
        if self.state != SessionState::Submitting || cycle != self.cycle {
            debug!(cycle, current = self.cycle, "Discarding stale assistant result");
            return;
        }
        let Some((query, asked_in)) = self.pending.take() else {
            self.enter(step, SessionState::Idle);
            return;
        };

        match result {
            Ok(reply) if !reply.trim().is_empty() => {
                self.transcript.clear();
                self.reply = Some(reply.clone());
                step.effects.push(Effect::Record {
                    query,
                    reply: reply.clone(),
                    locale: asked_in,
                });
                if self.capabilities.playback {
                    step.effects.push(Effect::Speak {
                        text: reply,
                        locale: self.locale,
                    });
                    self.enter(step, SessionState::Speaking);
                } else {
                    self.enter(step, SessionState::Idle);
                }
            },
            Ok(_) => self.fail(step, FailureKind::EmptyReply, true),
            Err(kind) => self.fail(step, kind, true),
        }
    }

    fn on_playback(&mut self, step: &mut Step, event: PlaybackEvent) {
        if self.state != SessionState::Speaking {
            return;
        }
        match event {
            PlaybackEvent::Started => {},
            PlaybackEvent::Ended => self.enter(step, SessionState::Idle),
            PlaybackEvent::Error(kind) => {
                if !kind.is_preemption() {
                    warn!(?kind, "Playback failed, reply stays visible");
                    self.failure = Some(FailureKind::PlaybackFailure);
                    step.failure = Some(FailureKind::PlaybackFailure);
                }
                self.enter(step, SessionState::Idle);
            },
        }
    }

    /// Speak the visible reply again. Only from `Idle`.
    fn replay(&mut self, step: &mut Step) {
        if !self.state.is_idle() || !self.capabilities.playback {
            debug!(state = %self.state, "Replay ignored");
            return;
        }
        let Some(reply) = self.reply.clone() else {
            debug!("Nothing to replay");
            return;
        };
        step.effects.push(Effect::Speak {
            text: reply,
            locale: self.locale,
        });
        self.enter(step, SessionState::Speaking);
    }

    fn change_locale(&mut self, step: &mut Step, locale: Locale) {
        if locale == self.locale {
            return;
        }
        self.locale = locale;
        step.effects.push(Effect::PersistLocale(locale));

        if self.state == SessionState::Speaking {
            if let Some(reply) = self.reply.clone() {
                step.effects.push(Effect::CancelPlayback);
                step.effects.push(Effect::Speak {
                    text: reply,
                    locale,
                });
            }
        }
    }

    fn cancel_everything(&mut self, step: &mut Step, release: Effect) {
        step.effects.push(Effect::ClearListenTimer);
        step.effects.push(release);
        step.effects.push(Effect::CancelPlayback);

        if self.state == SessionState::Listening {
            self.transcript.clear();
        }
        self.stopping = false;
        self.pending = None;
        self.enter(step, SessionState::Idle);
    }

    /// Pass through `Error(kind)` and settle in `Idle`
    fn fail(&mut self, step: &mut Step, kind: FailureKind, speak: bool) {
        self.failure = Some(kind);
        step.failure = Some(kind);
        self.pending = None;

        if kind.is_user_visible() {
            let message = kind.user_message(self.locale);
            self.reply = Some(message.to_string());
            if speak && self.capabilities.playback {
                step.effects.push(Effect::Speak {
                    text: message.to_string(),
                    locale: self.locale,
                });
            }
        }

        self.state = SessionState::Error(kind);
        step.transitions.push(self.state);
        self.state = SessionState::Idle;
        step.transitions.push(self.state);
    }

    fn enter(&mut self, step: &mut Step, state: SessionState) {
        if self.state != state {
            self.state = state;
            step.transitions.push(state);
        }
    }
}
