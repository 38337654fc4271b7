use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::chunker::{self, Chunk};
use crate::errors::PipelineError;
use crate::rag::IngestOutcome;
use crate::state::AppState;

/// One entry of the `/embed` texts array: either a bare string or an
/// object carrying its own source label.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    Plain(String),
    Labeled {
        content: String,
        #[serde(default)]
        source: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub struct EmbedRequest {
    pub texts: Vec<TextInput>,
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub name: String,
    pub content: String,
}

/// Ingest pre-split texts, bypassing the chunker. Mirrors the upload
/// scripts that split documents client-side.
pub async fn embed(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EmbedRequest>,
) -> Result<impl IntoResponse, PipelineError> {
    if payload.texts.is_empty() {
        return Err(PipelineError::InvalidInput(
            "texts must be a non-empty array".to_string(),
        ));
    }

    let filename = payload.filename;
    tracing::info!(
        "Processing {} texts from {}",
        payload.texts.len(),
        filename.as_deref().unwrap_or("unknown file")
    );

    let chunks: Vec<Chunk> = payload
        .texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| match text {
            TextInput::Plain(content) => Chunk {
                content,
                source_label: format!(
                    "{} (chunk {})",
                    filename.as_deref().unwrap_or("unknown"),
                    i + 1
                ),
            },
            TextInput::Labeled { content, source } => Chunk {
                content,
                source_label: source.unwrap_or_else(|| "unknown".to_string()),
            },
        })
        .collect();

    let outcome = state.ingestion.ingest(&chunks, filename.as_deref()).await?;

    Ok(outcome_response(outcome, filename.as_deref()))
}

/// Ingest a whole raw document: chunk on blank lines, then embed.
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UploadRequest>,
) -> Result<impl IntoResponse, PipelineError> {
    if payload.name.trim().is_empty() {
        return Err(PipelineError::InvalidInput(
            "document name must be non-empty".to_string(),
        ));
    }

    let chunks = chunker::chunk(&payload.content, &payload.name, state.config.min_chunk_len)?;
    let outcome = state.ingestion.ingest(&chunks, Some(&payload.name)).await?;

    Ok(outcome_response(outcome, Some(&payload.name)))
}

pub async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, PipelineError> {
    let documents = state.registry.list_documents().await?;
    Ok(Json(json!({
        "success": true,
        "total": documents.len(),
        "documents": documents,
    })))
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, PipelineError> {
    state.registry.delete_document(&id).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Document {} deleted successfully", id),
    })))
}

fn outcome_response(outcome: IngestOutcome, name: Option<&str>) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "embedded": outcome.embedded,
        "total": outcome.total,
        "skipped": outcome.skipped,
        "message": format!(
            "Successfully embedded {} out of {} documents from {}",
            outcome.embedded,
            outcome.total,
            name.unwrap_or("uploaded file"),
        ),
    }))
}
