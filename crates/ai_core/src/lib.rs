//! AI Core - HTTP clients for answering voice queries
//!
//! [`AssistantClient`] talks to the Voice Buddy backend proxy
//! (`POST /api/voice`). [`ChatCompletionEngine`] is what the proxy itself
//! uses to reach an OpenAI-compatible chat-completion service.

pub mod assistant_client;
pub mod chat_completion;
pub mod config;
pub mod error;
pub mod prompts;

pub use assistant_client::{AssistantClient, VoiceReply};
pub use chat_completion::{ChatCompletionEngine, Completion};
pub use config::{AssistantConfig, CompletionConfig};
pub use error::{AssistantError, CompletionError};
