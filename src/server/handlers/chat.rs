use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::errors::PipelineError;
use crate::llm::ChatMessage;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    pub message: String,
    /// Bounded conversation history, caller-owned. Older turns beyond the
    /// configured window are dropped by the composer.
    #[serde(default)]
    pub context: Vec<ChatMessage>,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequestBody>,
) -> Result<impl IntoResponse, PipelineError> {
    let outcome = state
        .composer
        .answer(&payload.message, &payload.context)
        .await?;

    Ok(Json(json!({
        "response": outcome.response,
        "sources": outcome.sources,
        "contextUsed": outcome.context_used,
    })))
}
