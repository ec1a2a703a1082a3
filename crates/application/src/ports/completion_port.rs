//! Completion port - Interface to the hosted chat-completion model
//!
//! Used by the backend proxy. Prompt composition per locale is the
//! adapter's concern.

use async_trait::async_trait;
use domain::{Locale, Query};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Result of a completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    /// Reply text, trimmed
    pub content: String,
    /// Model that produced the reply
    pub model: String,
    /// Upstream latency in milliseconds
    pub latency_ms: u64,
}

/// Port for chat-completion inference
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Whether credentials for the upstream service are present
    fn is_configured(&self) -> bool;

    /// Name of the model requests are sent to
    fn model(&self) -> String;

    /// Answer a validated query in the given locale
    ///
    /// # Errors
    /// * `Configuration` - credentials missing
    /// * `Timeout` - upstream bound expired
    /// * `UpstreamUnavailable` / `RequestRejected` - upstream non-success status
    /// * `EmptyReply` - no usable content in the upstream answer
    async fn answer(
        &self,
        query: &Query,
        locale: Locale,
    ) -> Result<CompletionResult, ApplicationError>;
}
