//! Voice session controller
//!
//! Owns one [`SessionMachine`] inside a tokio task and carries out its
//! effects against the capture, playback, assistant and storage ports. All
//! transitions happen on that single task; UI input arrives as commands
//! through a [`SessionHandle`].
//!
//! The assistant call runs in its own task. Its result comes back tagged
//! with the cycle that issued it, so a result arriving after the session
//! moved on is discarded.

use std::{collections::VecDeque, fmt, sync::Arc};

use domain::{Exchange, ExchangeId, FailureKind, Locale, PlaybackErrorKind, PlaybackEvent};
use tokio::{
    sync::{broadcast, mpsc, watch},
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::{debug, info, instrument, warn};

use super::{
    HistoryStore, SettingsStore,
    session_machine::{
        Capabilities, Effect, SessionConfig, SessionEvent, SessionMachine, SessionSnapshot,
    },
};
use crate::ports::{AssistantPort, SpeechCapturePort, SpeechPlaybackPort};

const NOTICE_CAPACITY: usize = 64;

type AskOutcome = (u64, Result<String, FailureKind>);

/// UI input accepted by a running session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    StartListening,
    StopListening,
    /// Speak the visible reply again
    Replay,
    StopSpeaking,
    SetLocale(Locale),
    PageHidden,
    Teardown,
}

impl From<SessionCommand> for SessionEvent {
    fn from(command: SessionCommand) -> Self {
        match command {
            SessionCommand::StartListening => Self::StartListening,
            SessionCommand::StopListening => Self::StopListening,
            SessionCommand::Replay => Self::Replay,
            SessionCommand::StopSpeaking => Self::StopSpeaking,
            SessionCommand::SetLocale(locale) => Self::LocaleChanged(locale),
            SessionCommand::PageHidden => Self::PageHidden,
            SessionCommand::Teardown => Self::Teardown,
        }
    }
}

/// Notifications broadcast to observers of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    /// A state was entered
    StateChanged(domain::SessionState),
    /// Transcript text changed
    TranscriptUpdated(String),
    /// New visible reply (assistant answer or failure message)
    Reply(String),
    /// A user-visible failure happened
    Failure { kind: FailureKind, message: String },
    /// An exchange was appended to history
    Recorded(ExchangeId),
}

/// Collaborators of a voice session
#[derive(Clone)]
pub struct SessionDeps {
    pub assistant: Arc<dyn AssistantPort>,
    pub capture: Arc<dyn SpeechCapturePort>,
    pub playback: Arc<dyn SpeechPlaybackPort>,
    pub history: Arc<HistoryStore>,
    pub settings: Arc<SettingsStore>,
}

impl fmt::Debug for SessionDeps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionDeps")
            .field("history", &self.history)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Handle to a running voice session
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    snapshot: watch::Receiver<SessionSnapshot>,
    notices: broadcast::Sender<SessionNotice>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn start_listening(&self) {
        self.send(SessionCommand::StartListening);
    }

    pub fn stop_listening(&self) {
        self.send(SessionCommand::StopListening);
    }

    /// Speak the visible reply again; ignored unless idle
    pub fn replay(&self) {
        self.send(SessionCommand::Replay);
    }

    /// Silence the reply being spoken
    pub fn stop_speaking(&self) {
        self.send(SessionCommand::StopSpeaking);
    }

    pub fn set_locale(&self, locale: Locale) {
        self.send(SessionCommand::SetLocale(locale));
    }

    /// Report that the host page became hidden
    pub fn page_hidden(&self) {
        self.send(SessionCommand::PageHidden);
    }

    /// Current view of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver that observes every published snapshot
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }

    /// Subscribe to notices sent from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionNotice> {
        self.notices.subscribe()
    }

    /// Tear the session down and wait until every resource is released
    pub async fn teardown(self) {
        self.send(SessionCommand::Teardown);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Voice session task failed");
        }
    }

    fn send(&self, command: SessionCommand) {
        if self.commands.send(command).is_err() {
            debug!(?command, "Voice session already stopped");
        }
    }
}

/// Event loop driving a [`SessionMachine`]
pub struct VoiceSessionController {
    machine: SessionMachine,
    deps: SessionDeps,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    ask_tx: mpsc::UnboundedSender<AskOutcome>,
    ask_rx: mpsc::UnboundedReceiver<AskOutcome>,
    deadline: Option<(u64, Instant)>,
    snapshot: watch::Sender<SessionSnapshot>,
    notices: broadcast::Sender<SessionNotice>,
}

impl fmt::Debug for VoiceSessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceSessionController")
            .field("machine", &self.machine)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl VoiceSessionController {
    /// Detect capabilities, restore the locale preference and start the
    /// session loop on the current runtime
    pub fn spawn(deps: SessionDeps, config: SessionConfig) -> SessionHandle {
        let capabilities = Capabilities {
            capture: deps.capture.is_supported(),
            playback: deps.playback.is_supported(),
        };
        let machine = SessionMachine::new(deps.settings.locale(), capabilities, config);

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (ask_tx, ask_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(machine.snapshot());
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        let controller = Self {
            machine,
            deps,
            commands: command_rx,
            ask_tx,
            ask_rx,
            deadline: None,
            snapshot: snapshot_tx,
            notices: notices.clone(),
        };
        let task = tokio::spawn(controller.run());

        SessionHandle {
            commands: command_tx,
            snapshot: snapshot_rx,
            notices,
            task,
        }
    }

    async fn run(mut self) {
        info!(
            capture = self.machine.capabilities().capture,
            playback = self.machine.capabilities().playback,
            locale = %self.machine.locale(),
            "Voice session started"
        );

        let mut capture_open = true;
        let mut playback_open = true;

        loop {
            let deadline = self.deadline;
            let capture = Arc::clone(&self.deps.capture);
            let playback = Arc::clone(&self.deps.playback);

            let event = tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => SessionEvent::from(command),
                    None => SessionEvent::Teardown,
                },
                Some((cycle, result)) = self.ask_rx.recv() => SessionEvent::AskFinished { cycle, result },
                event = capture.next_event(), if capture_open => match event {
                    Some(event) => SessionEvent::Capture(event),
                    None => {
                        debug!("Capture event stream closed");
                        capture_open = false;
                        continue;
                    },
                },
                event = playback.next_event(), if playback_open => match event {
                    Some(event) => SessionEvent::Playback(event),
                    None => {
                        debug!("Playback event stream closed");
                        playback_open = false;
                        continue;
                    },
                },
                () = sleep_until(deadline.map_or_else(Instant::now, |(_, at)| at)), if deadline.is_some() => {
                    SessionEvent::ListenTimeout { cycle: deadline.map_or(0, |(cycle, _)| cycle) }
                },
            };

            self.dispatch(event);

            if self.machine.is_torn_down() {
                break;
            }
        }

        info!("Voice session stopped");
    }

    /// Feed one event and everything its effects produce through the machine,
    /// then publish the resulting snapshot
    fn dispatch(&mut self, event: SessionEvent) {
        if matches!(event, SessionEvent::ListenTimeout { .. }) {
            self.deadline = None;
        }

        let before = self.machine.snapshot();
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let step = self.machine.handle(event);

            for state in &step.transitions {
                debug!(%state, "Session state changed");
                self.notify(SessionNotice::StateChanged(*state));
            }
            if let Some(kind) = step.failure.filter(FailureKind::is_user_visible) {
                self.notify(SessionNotice::Failure {
                    kind,
                    message: kind.user_message(self.machine.locale()).to_string(),
                });
            }
            for effect in step.effects {
                queue.extend(self.execute(effect));
            }
        }

        let after = self.machine.snapshot();
        if after.transcript != before.transcript {
            self.notify(SessionNotice::TranscriptUpdated(after.transcript.clone()));
        }
        if after.reply != before.reply {
            if let Some(reply) = &after.reply {
                self.notify(SessionNotice::Reply(reply.clone()));
            }
        }
        self.snapshot.send_replace(after);
    }

    fn execute(&mut self, effect: Effect) -> Vec<SessionEvent> {
        match effect {
            Effect::StartCapture { locale, continuous } => self
                .deps
                .capture
                .start(locale, continuous)
                .into_iter()
                .map(SessionEvent::Capture)
                .collect(),
            Effect::StopCapture => vec![SessionEvent::CaptureStopped(self.deps.capture.stop())],
            Effect::AbortCapture => {
                self.deps.capture.abort();
                Vec::new()
            },
            Effect::ReleaseCapture => {
                self.deps.capture.teardown();
                Vec::new()
            },
            Effect::ArmListenTimer { cycle, after } => {
                self.deadline = Some((cycle, Instant::now() + after));
                Vec::new()
            },
            Effect::ClearListenTimer => {
                self.deadline = None;
                Vec::new()
            },
            Effect::Ask {
                cycle,
                query,
                locale,
            } => {
                self.spawn_ask(cycle, query.as_str().to_string(), locale);
                Vec::new()
            },
            Effect::Record {
                query,
                reply,
                locale,
            } => {
                let exchange = Exchange::new(query, reply, locale);
                let id = exchange.id();
                self.deps.history.append(exchange);
                self.notify(SessionNotice::Recorded(id));
                Vec::new()
            },
            Effect::Speak { text, locale } => match self.deps.playback.speak(&text, locale) {
                Ok(()) => Vec::new(),
                Err(e) => {
                    warn!(error = %e, "Failed to start playback");
                    vec![SessionEvent::Playback(PlaybackEvent::Error(
                        PlaybackErrorKind::SynthesisFailed,
                    ))]
                },
            },
            Effect::CancelPlayback => {
                self.deps.playback.cancel();
                Vec::new()
            },
            Effect::PersistLocale(locale) => {
                self.deps.settings.set_locale(locale);
                Vec::new()
            },
        }
    }

    #[instrument(skip(self, query), fields(query_len = query.chars().count()))]
    fn spawn_ask(&self, cycle: u64, query: String, locale: Locale) {
        let assistant = Arc::clone(&self.deps.assistant);
        let results = self.ask_tx.clone();
        tokio::spawn(async move {
            let result = assistant.ask(&query, locale).await.map_err(|e| {
                warn!(error = %e, cycle, "Assistant request failed");
                e.kind()
            });
            if results.send((cycle, result)).is_err() {
                debug!(cycle, "Session gone, dropping assistant result");
            }
        });
    }

    fn notify(&self, notice: SessionNotice) {
        // No subscribers is fine
        let _ = self.notices.send(notice);
    }
}
