//! Document ingestion: chunk embedding and batched indexing.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use futures_util::future::join_all;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Serialize;

use crate::chunker::Chunk;
use crate::config::AppConfig;
use crate::errors::PipelineError;
use crate::index::{IndexedUnit, UnitMetadata, VectorIndex};
use crate::llm::LlmProvider;

/// Why a chunk was excluded from the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    TooShort,
    EmbeddingFailed,
    DimensionMismatch,
}

/// Result of one ingestion: how many chunks made it into the index, and
/// why the others did not. `embedded + skipped.len() == total` always.
#[derive(Debug, Serialize)]
pub struct IngestOutcome {
    pub embedded: usize,
    pub total: usize,
    pub skipped: BTreeMap<usize, SkipReason>,
}

/// Drives chunks through embedding into the vector index.
///
/// Per-chunk failures are recovered locally: one bad chunk never aborts
/// its siblings. All survivors go to the index in a single batch.
pub struct IngestionPipeline {
    llm: Arc<dyn LlmProvider>,
    index: Arc<dyn VectorIndex>,
    config: Arc<AppConfig>,
}

impl IngestionPipeline {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        index: Arc<dyn VectorIndex>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self { llm, index, config }
    }

    /// Embed `chunks` and upsert the survivors as one batch.
    ///
    /// When `document_name` is given it becomes the stored source for every
    /// unit; otherwise each chunk's own label is used. Chunks shorter than
    /// the ingestion floor are skipped (this path also serves externally
    /// supplied texts that bypassed the chunker). Fails with
    /// [`PipelineError::NoViableContent`] when nothing survives — an empty
    /// upsert is never issued.
    pub async fn ingest(
        &self,
        chunks: &[Chunk],
        document_name: Option<&str>,
    ) -> Result<IngestOutcome, PipelineError> {
        let total = chunks.len();

        // Embedding calls are independent; issue them concurrently. Order
        // does not matter for index content since every unit gets its own id.
        let embeds = join_all(chunks.iter().enumerate().map(|(i, chunk)| async move {
            let content = chunk.content.trim();
            if content.chars().count() < self.config.min_ingest_len {
                tracing::debug!("Skipping chunk {}: too short", i);
                return (i, Err(SkipReason::TooShort));
            }

            match self.llm.embed(content).await {
                Ok(values) if values.len() == self.config.dimension => (i, Ok(values)),
                Ok(values) => {
                    tracing::warn!(
                        "Wrong embedding dimension for chunk {}: expected {}, got {}",
                        i,
                        self.config.dimension,
                        values.len()
                    );
                    (i, Err(SkipReason::DimensionMismatch))
                }
                Err(err) => {
                    tracing::warn!("Error embedding chunk {}: {}", i, err);
                    (i, Err(SkipReason::EmbeddingFailed))
                }
            }
        }))
        .await;

        let mut units = Vec::new();
        let mut skipped = BTreeMap::new();

        for (i, result) in embeds {
            match result {
                Ok(values) => {
                    let content = chunks[i].content.trim();
                    let source = document_name
                        .map(str::to_string)
                        .unwrap_or_else(|| chunks[i].source_label.clone());
                    units.push(IndexedUnit {
                        id: generate_unit_id(i),
                        values,
                        metadata: UnitMetadata {
                            text: content.to_string(),
                            source,
                            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                            length: content.chars().count(),
                        },
                    });
                }
                Err(reason) => {
                    skipped.insert(i, reason);
                }
            }
        }

        if units.is_empty() {
            return Err(PipelineError::NoViableContent);
        }

        let embedded = units.len();
        tracing::info!("Storing {} of {} chunks in the index", embedded, total);
        self.index.upsert(units).await?;

        Ok(IngestOutcome {
            embedded,
            total,
            skipped,
        })
    }
}

/// Fresh unit id: ingestion time + sequence + random suffix, so ids stay
/// unique under concurrent ingests.
fn generate_unit_id(seq: usize) -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("doc-{}-{}-{}", Utc::now().timestamp_millis(), seq, suffix)
}
