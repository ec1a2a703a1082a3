//! Voice Buddy HTTP presentation layer
//!
//! Serves `POST /api/voice`, the backend endpoint the voice client asks,
//! and `GET /health`.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
