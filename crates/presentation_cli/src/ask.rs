//! One-shot questions

use application::{ApplicationError, HistoryStore, ports::AssistantPort};
use domain::{Exchange, Locale, Query};
use tracing::{info, warn};

/// Ask `query` once and record the exchange when a reply arrives
pub async fn ask_once(
    assistant: &dyn AssistantPort,
    history: &HistoryStore,
    query: &str,
    locale: Locale,
) -> Result<String, ApplicationError> {
    let reply = assistant.ask(query, locale).await.inspect_err(|e| {
        warn!(error = %e, kind = %e.kind(), "Question failed");
    })?;

    let exchange = Exchange::new(Query::parse(query)?, reply.clone(), locale);
    info!(id = %exchange.id(), "Recording exchange");
    history.append(exchange);
    Ok(reply)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;

    use async_trait::async_trait;
    use domain::FailureKind;
    use infrastructure::InMemoryKeyValueStore;

    use super::*;

    struct Scripted(Result<&'static str, fn() -> ApplicationError>);

    #[async_trait]
    impl AssistantPort for Scripted {
        async fn ask(&self, _query: &str, _locale: Locale) -> Result<String, ApplicationError> {
            match &self.0 {
                Ok(reply) => Ok((*reply).to_string()),
                Err(make) => Err(make()),
            }
        }
    }

    fn history() -> HistoryStore {
        HistoryStore::new(Arc::new(InMemoryKeyValueStore::new()))
    }

    #[tokio::test]
    async fn reply_is_recorded() {
        let history = history();
        let reply = ask_once(
            &Scripted(Ok("Apply at the block office.")),
            &history,
            "  ration card  ",
            Locale::Hi,
        )
        .await
        .unwrap();

        assert_eq!(reply, "Apply at the block office.");
        let entries = history.list();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].query().as_str(), "ration card");
        assert_eq!(entries[0].locale(), Locale::Hi);
    }

    #[tokio::test]
    async fn failure_records_nothing() {
        let history = history();
        let err = ask_once(
            &Scripted(Err(|| ApplicationError::Timeout(25_000))),
            &history,
            "ration card",
            Locale::En,
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Timeout);
        assert!(history.is_empty());
    }
}
