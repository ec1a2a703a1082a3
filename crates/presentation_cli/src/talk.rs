//! Interactive voice session in the terminal
//!
//! Typed lines are fed to a [`LineRecognitionEngine`] as final recognition
//! results while the session is listening. Lines starting with `/` are
//! session commands.

use std::sync::Arc;

use ai_speech::{LineRecognitionEngine, RecognitionEngine, SpeechConfig, SynthesisEngine};
use anyhow::Context;
use application::{
    HistoryStore, SessionConfig, SessionDeps, SessionHandle, SessionNotice, SessionSnapshot,
    SettingsStore, VoiceSessionController,
    ports::{AssistantPort, SpeechPlaybackPort},
};
use domain::{Locale, SessionState};
use infrastructure::{CaptureAdapter, PlaybackAdapter};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::{broadcast::error::RecvError, watch},
};
use tracing::{debug, warn};

use crate::history;

pub const HELP: &str = "\
Commands:
  /start        start listening
  /stop         stop listening and send what was heard
  /again        speak the last reply again
  /mute         stop speaking
  /lang <code>  switch language (en, hi)
  /hide         drop the current interaction, as if the page was hidden
  /history      show saved conversations
  /help         show this help
  /quit         leave
While listening, type what you would say.";

const NOT_LISTENING: &str = "Not listening. Type /start first.";
const CAPTURE_UNAVAILABLE: &str = "Speech input is not available; /start will report it.";
const NOTHING_TO_REPEAT: &str = "Nothing to repeat yet.";
const TEXT_ONLY: &str = "Speech output is not available; replies are shown as text only.";

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TalkInput {
    Start,
    Stop,
    Again,
    Mute,
    Lang(Locale),
    Hide,
    History,
    Help,
    Quit,
    /// Text spoken while listening
    Speech(String),
    Empty,
    /// Unusable input with the message to show
    Invalid(String),
}

/// What the front end does after an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    Say(String),
    Quiet,
    Quit,
}

/// Classify one line of input
pub fn parse_input(line: &str) -> TalkInput {
    let line = line.trim();
    if line.is_empty() {
        return TalkInput::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return TalkInput::Speech(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match (parts.next().unwrap_or_default(), parts.next()) {
        ("start", None) => TalkInput::Start,
        ("stop", None) => TalkInput::Stop,
        ("again", None) => TalkInput::Again,
        ("mute", None) => TalkInput::Mute,
        ("lang", Some(code)) => Locale::from_code(code).map_or_else(
            |_| TalkInput::Invalid(format!("Unknown language '{code}'. Use en or hi.")),
            TalkInput::Lang,
        ),
        ("lang", None) => TalkInput::Invalid("Usage: /lang <en|hi>".to_string()),
        ("hide", None) => TalkInput::Hide,
        ("history", None) => TalkInput::History,
        ("help", None) => TalkInput::Help,
        ("quit" | "exit", None) => TalkInput::Quit,
        _ => TalkInput::Invalid(format!("Unknown command '/{command}'. Type /help.")),
    }
}

/// Turns session notices into terminal lines
#[derive(Debug, Default)]
pub struct NoticeView {
    last_failure: Option<String>,
}

impl NoticeView {
    pub fn render(&mut self, notice: &SessionNotice) -> Option<String> {
        match notice {
            SessionNotice::StateChanged(state) => match state {
                SessionState::Listening => {
                    self.last_failure = None;
                    Some("🎙️  Listening... (/stop to send)".to_string())
                },
                SessionState::Submitting => Some("⏳ Thinking...".to_string()),
                SessionState::Speaking => Some("🔊 Speaking...".to_string()),
                SessionState::Idle | SessionState::Error(_) => None,
            },
            SessionNotice::TranscriptUpdated(text) if !text.is_empty() => {
                Some(format!("📝 {text}"))
            },
            SessionNotice::TranscriptUpdated(_) | SessionNotice::Recorded(_) => None,
            SessionNotice::Failure { message, .. } => {
                self.last_failure = Some(message.clone());
                Some(format!("⚠️  {message}"))
            },
            // Failure messages also become the visible reply
            SessionNotice::Reply(text) if self.last_failure.as_ref() == Some(text) => None,
            SessionNotice::Reply(text) => Some(format!("🤖 {text}")),
        }
    }
}

/// A running terminal session
#[derive(Debug)]
pub struct TalkSession {
    handle: SessionHandle,
    recognizer: Arc<LineRecognitionEngine>,
    history: Arc<HistoryStore>,
    settings: Arc<SettingsStore>,
}

impl TalkSession {
    /// Wire the adapters and start the session loop.
    ///
    /// `locale` overrides the saved preference and is saved itself.
    pub fn spawn(
        assistant: Arc<dyn AssistantPort>,
        synthesis: Arc<dyn SynthesisEngine>,
        speech: &SpeechConfig,
        history: Arc<HistoryStore>,
        settings: Arc<SettingsStore>,
        config: SessionConfig,
        locale: Option<Locale>,
    ) -> Self {
        if let Some(locale) = locale {
            settings.set_locale(locale);
        }

        let recognizer = Arc::new(LineRecognitionEngine::new());
        let engine: Arc<dyn RecognitionEngine> = Arc::clone(&recognizer) as _;
        let capture = CaptureAdapter::new(engine, speech);
        let playback: Arc<dyn SpeechPlaybackPort> =
            Arc::new(PlaybackAdapter::new(synthesis, speech));

        let handle = VoiceSessionController::spawn(
            SessionDeps {
                assistant,
                capture: Arc::new(capture),
                playback,
                history: Arc::clone(&history),
                settings: Arc::clone(&settings),
            },
            config,
        );

        Self {
            handle,
            recognizer,
            history,
            settings,
        }
    }

    /// Greeting listing the commands and missing capabilities
    pub fn banner(&self) -> String {
        let snapshot = self.handle.snapshot();
        let mut banner = format!(
            "Voice Buddy ({}). Type /help for commands.",
            snapshot.locale.display_name()
        );
        if !snapshot.capabilities.capture {
            banner.push('\n');
            banner.push_str(CAPTURE_UNAVAILABLE);
        }
        if !snapshot.capabilities.playback {
            banner.push('\n');
            banner.push_str(TEXT_ONLY);
        }
        banner
    }

    /// Act on one input
    pub fn apply(&self, input: TalkInput) -> Reaction {
        match input {
            TalkInput::Start => {
                self.handle.start_listening();
                Reaction::Quiet
            },
            TalkInput::Stop => {
                self.handle.stop_listening();
                Reaction::Quiet
            },
            TalkInput::Again => {
                let snapshot = self.handle.snapshot();
                if !snapshot.capabilities.playback {
                    Reaction::Say(TEXT_ONLY.to_string())
                } else if snapshot.reply.is_none() {
                    Reaction::Say(NOTHING_TO_REPEAT.to_string())
                } else {
                    self.handle.replay();
                    Reaction::Quiet
                }
            },
            TalkInput::Mute => {
                self.handle.stop_speaking();
                Reaction::Quiet
            },
            TalkInput::Lang(locale) => {
                self.handle.set_locale(locale);
                Reaction::Say(format!("Language: {}", locale.display_name()))
            },
            TalkInput::Hide => {
                self.handle.page_hidden();
                Reaction::Say("Interaction dropped.".to_string())
            },
            TalkInput::History => Reaction::Say(history::render(&self.history.list())),
            TalkInput::Help => Reaction::Say(HELP.to_string()),
            TalkInput::Quit => Reaction::Quit,
            TalkInput::Speech(text) => {
                if self.recognizer.hear(&text) {
                    Reaction::Quiet
                } else {
                    Reaction::Say(NOT_LISTENING.to_string())
                }
            },
            TalkInput::Empty => Reaction::Quiet,
            TalkInput::Invalid(message) => Reaction::Say(message),
        }
    }

    /// Receiver observing every session snapshot
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.handle.watch()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Saved locale preference
    pub fn saved_locale(&self) -> Locale {
        self.settings.locale()
    }

    /// Read lines from `input` and write session output to `out` until
    /// `/quit` or end of input, then tear the session down
    pub async fn run<R, W>(self, input: R, mut out: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut notices = self.handle.subscribe();
        let mut view = NoticeView::default();

        write_line(&mut out, &self.banner()).await?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read input")? else {
                        debug!("Input closed");
                        break;
                    };
                    match self.apply(parse_input(&line)) {
                        Reaction::Say(text) => write_line(&mut out, &text).await?,
                        Reaction::Quiet => {},
                        Reaction::Quit => break,
                    }
                },
                notice = notices.recv() => match notice {
                    Ok(notice) => {
                        if let Some(text) = view.render(&notice) {
                            write_line(&mut out, &text).await?;
                        }
                    },
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "Missed session notices"),
                    Err(RecvError::Closed) => break,
                },
            }
        }

        self.handle.teardown().await;
        write_line(&mut out, "Bye!").await?;
        Ok(())
    }
}

async fn write_line<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> anyhow::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use domain::FailureKind;

    use super::*;

    #[test]
    fn plain_lines_are_speech() {
        assert_eq!(
            parse_input("  what is PM-KISAN? "),
            TalkInput::Speech("what is PM-KISAN?".to_string())
        );
        assert_eq!(parse_input("   "), TalkInput::Empty);
    }

    #[test]
    fn commands_are_recognized() {
        assert_eq!(parse_input("/start"), TalkInput::Start);
        assert_eq!(parse_input("/stop"), TalkInput::Stop);
        assert_eq!(parse_input("/again"), TalkInput::Again);
        assert_eq!(parse_input("/mute"), TalkInput::Mute);
        assert_eq!(parse_input("/lang hi"), TalkInput::Lang(Locale::Hi));
        assert_eq!(parse_input("/hide"), TalkInput::Hide);
        assert_eq!(parse_input("/history"), TalkInput::History);
        assert_eq!(parse_input("/quit"), TalkInput::Quit);
        assert_eq!(parse_input("/exit"), TalkInput::Quit);
    }

    #[test]
    fn bad_commands_explain_themselves() {
        assert!(matches!(parse_input("/lang fr"), TalkInput::Invalid(m) if m.contains("'fr'")));
        assert!(matches!(parse_input("/lang"), TalkInput::Invalid(m) if m.starts_with("Usage")));
        assert!(matches!(parse_input("/dance"), TalkInput::Invalid(m) if m.contains("/help")));
        assert!(matches!(parse_input("/start now"), TalkInput::Invalid(_)));
    }

    #[test]
    fn failure_message_is_not_repeated_as_reply() {
        let mut view = NoticeView::default();
        let message = FailureKind::NoSpeechDetected.user_message(Locale::En).to_string();

        let shown = view.render(&SessionNotice::Failure {
            kind: FailureKind::NoSpeechDetected,
            message: message.clone(),
        });
        assert_eq!(shown, Some(format!("⚠️  {message}")));
        assert_eq!(view.render(&SessionNotice::Reply(message)), None);

        assert_eq!(
            view.render(&SessionNotice::Reply("Namaste".into())),
            Some("🤖 Namaste".to_string())
        );
    }

    #[test]
    fn quiet_notices() {
        let mut view = NoticeView::default();
        assert_eq!(view.render(&SessionNotice::StateChanged(SessionState::Idle)), None);
        assert_eq!(view.render(&SessionNotice::TranscriptUpdated(String::new())), None);
        assert!(
            view.render(&SessionNotice::StateChanged(SessionState::Listening))
                .is_some()
        );
    }
}
