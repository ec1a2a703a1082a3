//! Speech playback port - Interface to a text-to-speech capability

use async_trait::async_trait;
use domain::{Locale, PlaybackEvent};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for speaking text aloud
///
/// At most one utterance plays at a time: `speak` cancels whatever is
/// playing first.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpeechPlaybackPort: Send + Sync {
    /// True iff a synthesizer is available
    fn is_supported(&self) -> bool;

    /// Start speaking `text` with a voice matching `locale`
    fn speak(&self, text: &str, locale: Locale) -> Result<(), ApplicationError>;

    /// Stop playback immediately. Safe when idle.
    fn cancel(&self);

    /// Next event of the current utterance, `None` once the stream is closed
    async fn next_event(&self) -> Option<PlaybackEvent>;
}
