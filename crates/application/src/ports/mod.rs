//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod assistant_port;
mod completion_port;
mod key_value_store;
mod speech_capture_port;
mod speech_playback_port;

pub use assistant_port::AssistantPort;
#[cfg(test)]
pub use assistant_port::MockAssistantPort;
#[cfg(test)]
pub use completion_port::MockCompletionPort;
pub use completion_port::{CompletionPort, CompletionResult};
pub use key_value_store::KeyValueStorePort;
#[cfg(test)]
pub use key_value_store::MockKeyValueStorePort;
#[cfg(test)]
pub use speech_capture_port::MockSpeechCapturePort;
pub use speech_capture_port::SpeechCapturePort;
#[cfg(test)]
pub use speech_playback_port::MockSpeechPlaybackPort;
pub use speech_playback_port::SpeechPlaybackPort;
