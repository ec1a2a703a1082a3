//! Value Objects - Immutable, identity-less domain primitives

mod exchange_id;
mod failure_kind;
mod locale;
mod query;
mod session_state;

pub use exchange_id::ExchangeId;
pub use failure_kind::FailureKind;
pub use locale::Locale;
pub use query::{MAX_QUERY_CHARS, Query};
pub use session_state::SessionState;
