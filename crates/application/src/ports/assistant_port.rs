//! Assistant port - Interface to the backend that answers voice queries

use async_trait::async_trait;
use domain::Locale;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for asking the assistant backend
///
/// Implementations issue exactly one request per call, bounded in time, and
/// re-validate the query before any network I/O.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AssistantPort: Send + Sync {
    /// Ask a question and return the reply text
    ///
    /// # Errors
    /// * `InvalidInput` / `Domain` - empty or too long query, before any I/O
    /// * `Timeout` - bounded wait expired
    /// * `UpstreamUnavailable` - backend 5xx or unreachable
    /// * `RequestRejected` - backend 4xx
    /// * `EmptyReply` - success without usable text
    async fn ask(&self, query: &str, locale: Locale) -> Result<String, ApplicationError>;
}
