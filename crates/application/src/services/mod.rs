//! Application services - Use case implementations

mod assistant_proxy_service;
mod history_store;
mod session_machine;
mod settings_store;
mod voice_session_controller;

pub use assistant_proxy_service::{
    AssistantProxyService, EMPTY_QUERY_MESSAGE, INVALID_LANGUAGE_MESSAGE, ProxyAnswer,
    QUERY_TOO_LONG_MESSAGE,
};
pub use history_store::{DEFAULT_HISTORY_KEY, HistoryStore};
pub use session_machine::{
    Capabilities, DEFAULT_LISTEN_TIMEOUT, Effect, SessionConfig, SessionEvent, SessionMachine,
    SessionSnapshot, Step,
};
pub use settings_store::{DEFAULT_SETTINGS_KEY, Settings, SettingsStore};
pub use voice_session_controller::{
    SessionCommand, SessionDeps, SessionHandle, SessionNotice, VoiceSessionController,
};
