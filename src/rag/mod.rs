//! The retrieval-augmented answering core.
//!
//! This module owns every nontrivial decision in the system:
//! - `IngestionPipeline`: chunk embedding with per-chunk failure recovery
//!   and a single batched upsert
//! - `Retriever`: nearest-neighbor lookup with a fixed relevance gate
//! - `AnswerComposer`: grounded prompt assembly, bounded history and
//!   citation construction
//! - `DocumentRegistry`: best-effort listing and idempotent deletion
//!
//! Everything here is stateless between calls; the vector index is the
//! only durable state.

mod composer;
mod ingest;
mod registry;
mod retriever;

pub use composer::{AnswerComposer, ChatOutcome, Citation};
pub use ingest::{IngestOutcome, IngestionPipeline, SkipReason};
pub use registry::{DocumentRegistry, DocumentSummary};
pub use retriever::{RetrievedMatch, Retriever};

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::config::{AppConfig, IndexBackend};
    use crate::errors::PipelineError;
    use crate::llm::{ChatRequest, LlmProvider};

    /// Scripted provider: embeddings are looked up by exact text, chat
    /// replies with a canned string and records every request it saw.
    pub struct MockLlm {
        embeddings: Mutex<HashMap<String, Vec<f32>>>,
        fail_embed: bool,
        fail_chat: bool,
        pub chat_calls: Mutex<Vec<ChatRequest>>,
        reply: String,
    }

    impl MockLlm {
        pub fn new() -> Self {
            Self {
                embeddings: Mutex::new(HashMap::new()),
                fail_embed: false,
                fail_chat: false,
                chat_calls: Mutex::new(Vec::new()),
                reply: "a generated answer".to_string(),
            }
        }

        pub fn with_embedding(self, text: &str, vector: Vec<f32>) -> Self {
            self.embeddings
                .lock()
                .unwrap()
                .insert(text.to_string(), vector);
            self
        }

        pub fn failing_embeddings() -> Self {
            Self {
                fail_embed: true,
                ..Self::new()
            }
        }

        pub fn failing_chat() -> Self {
            Self {
                fail_chat: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlm {
        fn name(&self) -> &str {
            "mock"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
            if self.fail_embed {
                return Err(PipelineError::EmbeddingUnavailable(
                    "mock gateway down".to_string(),
                ));
            }
            self.embeddings
                .lock()
                .unwrap()
                .get(text)
                .cloned()
                .ok_or_else(|| {
                    PipelineError::EmbeddingUnavailable(format!("no scripted embedding: {}", text))
                })
        }

        async fn chat(&self, request: ChatRequest) -> Result<String, PipelineError> {
            self.chat_calls.lock().unwrap().push(request);
            if self.fail_chat {
                return Err(PipelineError::GenerationFailed(
                    "mock generation down".to_string(),
                ));
            }
            Ok(self.reply.clone())
        }
    }

    /// Three-dimensional config so scripted vectors stay readable.
    pub fn test_config() -> AppConfig {
        AppConfig {
            dimension: 3,
            index_backend: IndexBackend::Memory,
            ..AppConfig::default()
        }
    }
}
