//! Application state shared across handlers

use std::sync::Arc;

use application::AssistantProxyService;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Use case behind the voice endpoint
    pub voice_service: Arc<AssistantProxyService>,
}

impl AppState {
    pub fn new(voice_service: AssistantProxyService) -> Self {
        Self {
            voice_service: Arc::new(voice_service),
        }
    }
}
