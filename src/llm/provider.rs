use async_trait::async_trait;

use crate::errors::PipelineError;
use super::types::ChatRequest;

/// Embedding and generation, behind one provider seam.
///
/// Implementations own their transport and timeout policy; the pipeline
/// treats any failure as a standard dependency failure and never retries.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "workers_ai")
    fn name(&self) -> &str;

    /// embed a single text into a fixed-dimension vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError>;

    /// chat completion (non-streaming)
    async fn chat(&self, request: ChatRequest) -> Result<String, PipelineError>;
}
