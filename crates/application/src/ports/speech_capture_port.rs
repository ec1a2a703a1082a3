//! Speech capture port - Interface to a speech-to-text capability
//!
//! Control calls are synchronous and return the events they cause right away
//! (for example the transcript flush of `stop`). Events originating in the
//! recognizer itself are pulled with [`SpeechCapturePort::next_event`].

use async_trait::async_trait;
use domain::{CaptureEvent, Locale};
#[cfg(test)]
use mockall::automock;

/// Port for microphone capture with streaming recognition
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpeechCapturePort: Send + Sync {
    /// True iff a recognizer is available
    fn is_supported(&self) -> bool;

    /// Begin capture. No-op while already capturing; an absent capability
    /// yields an `Error(Unsupported)` event instead of failing.
    fn start(&self, locale: Locale, continuous: bool) -> Vec<CaptureEvent>;

    /// End capture and flush the transcript: a `Final` with the pending
    /// interim text, or `NoSpeech` when nothing was recognized.
    fn stop(&self) -> Vec<CaptureEvent>;

    /// Abort capture and drop any pending transcript. Releases the microphone.
    fn abort(&self);

    /// Release every resource held by the capability
    fn teardown(&self);

    /// Next event emitted by the recognizer, `None` once the stream is closed
    async fn next_event(&self) -> Option<CaptureEvent>;
}
