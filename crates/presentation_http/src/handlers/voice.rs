//! Voice query handler
//!
//! The body is read raw and inspected by hand: a missing API key must be
//! reported before anything about the body, and a `query` of the wrong JSON
//! type is a validation failure rather than a deserialization one.

use axum::{Json, body::Bytes, extract::State};
use domain::Locale;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{error::ApiError, state::AppState};

/// Successful voice response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceResponse {
    pub success: bool,
    /// Assistant reply, trimmed
    pub response: String,
    pub language: Locale,
    /// Model that produced the reply
    pub model_used: String,
}

/// Fields of a voice request as sent by the client
#[derive(Debug, Default, PartialEq, Eq)]
struct VoiceRequest {
    /// `None` unless `query` is a JSON string
    query: Option<String>,
    /// `None` when absent; a non-string value becomes an unusable code
    language: Option<String>,
}

impl VoiceRequest {
    fn from_json(value: &Value) -> Self {
        let query = value
            .get("query")
            .and_then(Value::as_str)
            .map(str::to_string);
        let language = value.get("language").map(|v| match v {
            Value::String(code) => code.clone(),
            _ => String::new(),
        });
        Self { query, language }
    }
}

/// Answer a voice query
#[instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn ask(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<VoiceResponse>, ApiError> {
    if !state.voice_service.is_configured() {
        return Err(ApiError::Configuration);
    }

    let value: Value = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "Rejecting malformed voice request");
        ApiError::MalformedBody
    })?;
    let request = VoiceRequest::from_json(&value);

    let answer = state
        .voice_service
        .answer(request.query.as_deref(), request.language.as_deref())
        .await?;

    Ok(Json(VoiceResponse {
        success: true,
        response: answer.response,
        language: answer.language,
        model_used: answer.model_used,
    }))
}
