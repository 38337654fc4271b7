use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::{AppConfig, IndexBackend};
use crate::index::{MemoryIndex, VectorIndex, VectorizeIndex};
use crate::llm::{LlmProvider, WorkersAiProvider};
use crate::rag::{AnswerComposer, DocumentRegistry, IngestionPipeline, Retriever};

/// Shared application state: configuration plus the collaborator handles
/// and the stateless pipeline services built over them.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub ingestion: IngestionPipeline,
    pub composer: AnswerComposer,
    pub registry: DocumentRegistry,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn initialize(config: AppConfig) -> anyhow::Result<Arc<Self>> {
        let config = Arc::new(config);

        let llm: Arc<dyn LlmProvider> = Arc::new(WorkersAiProvider::new(&config)?);
        let index: Arc<dyn VectorIndex> = match config.index_backend {
            IndexBackend::Vectorize => Arc::new(VectorizeIndex::new(&config)?),
            IndexBackend::Memory => Arc::new(MemoryIndex::new()),
        };

        let ingestion = IngestionPipeline::new(llm.clone(), index.clone(), config.clone());
        let retriever = Retriever::new(index.clone(), config.clone());
        let composer = AnswerComposer::new(llm, retriever, config.clone());
        let registry = DocumentRegistry::new(index, config.clone());

        Ok(Arc::new(AppState {
            config,
            ingestion,
            composer,
            registry,
            started_at: Utc::now(),
        }))
    }
}
