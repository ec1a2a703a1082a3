//! Adapters implementing application ports

mod assistant_adapter;
mod completion_adapter;
mod speech_capture_adapter;
mod speech_playback_adapter;

pub use assistant_adapter::AssistantAdapter;
pub use completion_adapter::CompletionAdapter;
pub use speech_capture_adapter::CaptureAdapter;
pub use speech_playback_adapter::PlaybackAdapter;
