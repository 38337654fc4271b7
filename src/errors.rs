use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy for the retrieval pipeline.
///
/// Per-chunk failures inside an ingestion batch are recovered locally and
/// recorded as skip reasons; only call-level failures surface as one of
/// these variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no chunks survived filtering")]
    EmptyInput,
    #[error("no valid embeddings were generated")]
    NoViableContent,
    #[error("embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),
    #[error("generation failed: {0}")]
    GenerationFailed(String),
    #[error("vector index unavailable: {0}")]
    IndexUnavailable(String),
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("not found: {0}")]
    NotFound(String),
}

impl PipelineError {
    pub fn embedding<E: std::fmt::Display>(err: E) -> Self {
        PipelineError::EmbeddingUnavailable(err.to_string())
    }

    pub fn index<E: std::fmt::Display>(err: E) -> Self {
        PipelineError::IndexUnavailable(err.to_string())
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            PipelineError::InvalidInput(_)
            | PipelineError::EmptyInput
            | PipelineError::NoViableContent => StatusCode::BAD_REQUEST,
            PipelineError::NotFound(_) => StatusCode::NOT_FOUND,
            PipelineError::EmbeddingUnavailable(_)
            | PipelineError::GenerationFailed(_)
            | PipelineError::IndexUnavailable(_) => StatusCode::BAD_GATEWAY,
            PipelineError::DimensionMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
