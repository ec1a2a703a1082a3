//! Command-line synthesis engine
//!
//! Speaks each utterance by running a local TTS program with an
//! `espeak-ng` compatible command line. Text is written to the program's
//! stdin, so it is never parsed as options.
//!
//! # Prerequisites
//!
//! ```bash
//! sudo apt install espeak-ng
//! espeak-ng --voices=hi
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, error, instrument, warn};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::{SynthesisEngine, SynthesisSink};
use crate::types::{SynthesisEvent, Utterance, UtteranceId, VoiceInfo};

/// Words per minute at rate 1.0
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

type InFlight = Arc<Mutex<Option<(UtteranceId, oneshot::Sender<()>)>>>;

/// Synthesis engine running one program invocation per utterance
#[derive(Debug, Clone)]
pub struct CommandSynthesisEngine {
    program: String,
    voices: BTreeMap<String, String>,
    in_flight: InFlight,
}

impl CommandSynthesisEngine {
    /// Create an engine from the speech configuration
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn new(config: &SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;
        Ok(Self {
            program: config.command.clone(),
            voices: config.voices.clone(),
            in_flight: Arc::new(Mutex::new(None)),
        })
    }

    /// Resolve the program to an executable path
    fn resolve_program(&self) -> Option<PathBuf> {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return program.is_file().then(|| program.to_path_buf());
        }
        std::env::var_os("PATH").and_then(|paths| {
            std::env::split_paths(&paths)
                .map(|dir| dir.join(program))
                .find(|candidate| candidate.is_file())
        })
    }

    /// Program voice for an utterance
    fn voice_for(&self, utterance: &Utterance) -> Option<String> {
        utterance
            .voice
            .as_ref()
            .map(|v| v.id.clone())
            .or_else(|| self.voices.get(&utterance.lang).cloned())
    }

    /// Command-line arguments for an utterance
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn arguments(&self, utterance: &Utterance) -> Vec<String> {
        let mut args = vec!["--stdin".to_string()];
        if let Some(voice) = self.voice_for(utterance) {
            args.push("-v".to_string());
            args.push(voice);
        }
        let words_per_minute = (BASE_WORDS_PER_MINUTE * utterance.rate).round().max(80.0) as u32;
        let pitch = (utterance.pitch * 50.0).round().clamp(0.0, 99.0) as u32;
        let amplitude = (utterance.volume * 100.0).round().clamp(0.0, 200.0) as u32;
        args.extend([
            "-s".to_string(),
            words_per_minute.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            "-a".to_string(),
            amplitude.to_string(),
        ]);
        args
    }
}

#[instrument(skip(command, text, sink, cancel, in_flight), fields(utterance = %id))]
async fn run_utterance(
    mut command: Command,
    id: UtteranceId,
    text: String,
    sink: SynthesisSink,
    cancel: oneshot::Receiver<()>,
    in_flight: InFlight,
) {
    let finish = |event: SynthesisEvent| {
        let mut current = in_flight.lock();
        if current.as_ref().is_some_and(|(current_id, _)| *current_id == id) {
            *current = None;
        }
        drop(current);
        sink(event);
    };

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            let code = if e.kind() == std::io::ErrorKind::NotFound {
                "synthesis-unavailable"
            } else {
                "synthesis-failed"
            };
            error!(error = %e, "Failed to run synthesis program");
            finish(SynthesisEvent::Error(id, code.to_string()));
            return;
        },
    };

    if let Some(mut stdin) = child.stdin.take() {
        match stdin.write_all(text.as_bytes()).await {
            Ok(()) => {},
            // Exited without reading; the exit status decides
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                debug!("Synthesis program closed stdin early");
            },
            Err(e) => {
                warn!(error = %e, "Failed to write to synthesis program stdin");
                let _ = child.kill().await;
                finish(SynthesisEvent::Error(id, "synthesis-failed".to_string()));
                return;
            },
        }
        // stdin is dropped here, closing it
    }

    sink(SynthesisEvent::Start(id));

    tokio::select! {
        status = child.wait() => match status {
            Ok(status) if status.success() => {
                debug!("Utterance finished");
                finish(SynthesisEvent::End(id));
            },
            Ok(status) => {
                warn!(%status, "Synthesis program failed");
                finish(SynthesisEvent::Error(id, "synthesis-failed".to_string()));
            },
            Err(e) => {
                warn!(error = %e, "Failed to wait for synthesis program");
                finish(SynthesisEvent::Error(id, "synthesis-failed".to_string()));
            },
        },
        _ = cancel => {
            if let Err(e) = child.kill().await {
                warn!(error = %e, "Failed to kill synthesis program");
            }
            debug!("Utterance interrupted");
            sink(SynthesisEvent::Error(id, "interrupted".to_string()));
        },
    }
}

impl SynthesisEngine for CommandSynthesisEngine {
    fn is_available(&self) -> bool {
        self.resolve_program().is_some()
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        self.voices
            .iter()
            .enumerate()
            .map(|(index, (lang, voice))| {
                let info = VoiceInfo::new(voice, format!("{} {voice}", self.program), lang);
                if index == 0 { info.as_default() } else { info }
            })
            .collect()
    }

    fn speak(&self, utterance: Utterance, sink: SynthesisSink) -> Result<(), SpeechError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SpeechError::NotAvailable(format!("no async runtime: {e}")))?;
        let program = self.resolve_program().ok_or_else(|| {
            SpeechError::NotAvailable(format!(
                "'{}' not found. Please install it or set speech.command.",
                self.program
            ))
        })?;

        self.cancel();

        let mut command = Command::new(program);
        command
            .args(self.arguments(&utterance))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        debug!("Running synthesis program: {:?}", command);

        let (cancel_tx, cancel_rx) = oneshot::channel();
        *self.in_flight.lock() = Some((utterance.id, cancel_tx));

        runtime.spawn(run_utterance(
            command,
            utterance.id,
            utterance.text,
            sink,
            cancel_rx,
            Arc::clone(&self.in_flight),
        ));
        Ok(())
    }

    fn cancel(&self) {
        if let Some((id, cancel)) = self.in_flight.lock().take() {
            debug!(utterance = %id, "Interrupting utterance");
            let _ = cancel.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn utterance(id: u64, lang: &str, voice: Option<VoiceInfo>) -> Utterance {
        Utterance {
            id: UtteranceId::new(id),
            text: "hello".to_string(),
            lang: lang.to_string(),
            voice,
            rate: 0.9,
            pitch: 1.0,
            volume: 0.8,
        }
    }

    fn engine(program: &str) -> CommandSynthesisEngine {
        CommandSynthesisEngine::new(&SpeechConfig {
            command: program.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn recording_sink() -> (SynthesisSink, tokio::sync::mpsc::UnboundedReceiver<SynthesisEvent>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let sink: SynthesisSink = Arc::new(move |event| {
            let _ = tx.send(event);
        });
        (sink, rx)
    }

    #[test]
    fn arguments_follow_settings() {
        let engine = engine("espeak-ng");
        let args = engine.arguments(&utterance(1, "hi-IN", None));
        assert_eq!(
            args,
            vec!["--stdin", "-v", "hi", "-s", "158", "-p", "50", "-a", "80"]
        );

        let chosen = VoiceInfo::new("en-gb", "British", "en-GB");
        let args = engine.arguments(&utterance(2, "en-US", Some(chosen)));
        assert_eq!(args[2], "en-gb");
    }

    #[test]
    fn voices_come_from_config() {
        let voices = engine("espeak-ng").voices();
        assert_eq!(voices.len(), 2);
        assert!(voices[0].is_default);
        assert_eq!(voices[1].lang, "hi-IN");
        assert_eq!(voices[1].id, "hi");
    }

    #[test]
    fn missing_program_is_unavailable() {
        let engine = engine("definitely-not-a-tts-program-4711");
        assert!(!engine.is_available());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_program_reports_start_and_end() {
        let engine = engine("true");
        let (sink, mut events) = recording_sink();
        engine.speak(utterance(1, "en-US", None), sink).unwrap();

        let id = UtteranceId::new(1);
        assert_eq!(events.recv().await, Some(SynthesisEvent::Start(id)));
        assert_eq!(events.recv().await, Some(SynthesisEvent::End(id)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_program_reports_error() {
        let engine = engine("false");
        let (sink, mut events) = recording_sink();
        engine.speak(utterance(1, "en-US", None), sink).unwrap();

        let id = UtteranceId::new(1);
        assert_eq!(events.recv().await, Some(SynthesisEvent::Start(id)));
        assert_eq!(
            events.recv().await,
            Some(SynthesisEvent::Error(id, "synthesis-failed".to_string()))
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancel_interrupts_running_program() {
        // `yes` repeats its arguments until killed
        let engine = engine("yes");
        let (sink, mut events) = recording_sink();
        engine.speak(utterance(1, "en-US", None), sink).unwrap();

        let id = UtteranceId::new(1);
        assert_eq!(events.recv().await, Some(SynthesisEvent::Start(id)));
        engine.cancel();

        let next = tokio::time::timeout(Duration::from_secs(5), events.recv()).await;
        assert_eq!(
            next.unwrap(),
            Some(SynthesisEvent::Error(id, "interrupted".to_string()))
        );
    }
}
