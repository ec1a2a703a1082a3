//! Domain entities - Objects with identity and lifecycle

mod exchange;
mod history_log;
mod transcript;

pub use exchange::Exchange;
pub use history_log::{DEFAULT_HISTORY_CAP, HistoryLog};
pub use transcript::Transcript;
