//! History listing and editing

use std::io::{BufRead, Write};

use anyhow::{Context, bail};
use application::HistoryStore;
use chrono::Local;
use domain::{Exchange, ExchangeId};

use crate::cli::HistoryAction;

const EMPTY_HISTORY: &str = "No conversations yet.";
const CLEAR_PROMPT: &str = "Are you sure you want to clear all history? [y/N] ";

/// Render one exchange as a list entry with its local time
pub fn format_exchange(exchange: &Exchange) -> String {
    let when = exchange
        .timestamp()
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M");
    format!(
        "[{when}] ({}) {}\n  Q: {}\n  A: {}",
        exchange.locale().code(),
        exchange.id(),
        exchange.query(),
        exchange.reply()
    )
}

/// Render a whole history, most recent first as given
pub fn render(exchanges: &[Exchange]) -> String {
    if exchanges.is_empty() {
        return EMPTY_HISTORY.to_string();
    }
    exchanges
        .iter()
        .map(format_exchange)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Ask before clearing. Anything but `y`/`yes`, including end of input,
/// declines.
pub fn confirm_clear<R: BufRead, W: Write>(mut input: R, mut output: W) -> std::io::Result<bool> {
    output.write_all(CLEAR_PROMPT.as_bytes())?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Carry out a history subcommand and return the text to show
pub fn run(action: &HistoryAction, store: &HistoryStore) -> anyhow::Result<String> {
    match action {
        HistoryAction::List => Ok(render(&store.list())),
        HistoryAction::Clear { .. } => {
            let count = store.len();
            store.clear();
            Ok(format!("Cleared {count} exchange(s)."))
        },
        HistoryAction::Remove { id } => {
            let id = ExchangeId::parse(id.trim())
                .with_context(|| format!("'{id}' is not a valid exchange id"))?;
            if !store.remove(id) {
                bail!("No exchange with id {id}");
            }
            Ok(format!("Removed {id}."))
        },
    }
}
