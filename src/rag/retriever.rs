//! Nearest-neighbor retrieval with a fixed relevance gate.

use std::sync::Arc;

use serde::Serialize;

use crate::config::AppConfig;
use crate::errors::PipelineError;
use crate::index::VectorIndex;

/// A retrieved chunk with its similarity score. Ephemeral: lives only for
/// the duration of one answer call.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedMatch {
    pub text: String,
    pub source: String,
    pub score: f64,
}

pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    config: Arc<AppConfig>,
}

impl Retriever {
    pub fn new(index: Arc<dyn VectorIndex>, config: Arc<AppConfig>) -> Self {
        Self { index, config }
    }

    /// Query the index for the configured top-k neighbors and drop anything
    /// scoring at or below the relevance threshold. The index's native
    /// descending-score order is preserved among the survivors.
    ///
    /// An empty result is a valid outcome: no grounding context available.
    pub async fn retrieve(&self, query_vector: &[f32]) -> Result<Vec<RetrievedMatch>, PipelineError> {
        let matches = self
            .index
            .query(query_vector, self.config.top_k, true)
            .await?;

        tracing::debug!("Found {} potential matches", matches.len());

        let retained: Vec<RetrievedMatch> = matches
            .into_iter()
            .filter(|m| m.score > self.config.score_threshold)
            .filter_map(|m| {
                let Some(metadata) = m.metadata else {
                    tracing::debug!("Dropping match {} without metadata", m.id);
                    return None;
                };
                Some(RetrievedMatch {
                    text: metadata.text,
                    source: metadata.source,
                    score: m.score,
                })
            })
            .collect();

        tracing::debug!("Using {} relevant matches for context", retained.len());
        Ok(retained)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::index::{IndexedUnit, MemoryIndex, UnitMetadata, VectorIndex};
    use crate::rag::test_support::test_config;

    fn unit(id: &str, values: Vec<f32>) -> IndexedUnit {
        IndexedUnit {
            id: id.to_string(),
            values,
            metadata: UnitMetadata {
                text: format!("text of {}", id),
                source: "doc.txt".to_string(),
                timestamp: "2024-01-01T00:00:00.000Z".to_string(),
                length: 10,
            },
        }
    }

    async fn retriever_with(units: Vec<IndexedUnit>) -> Retriever {
        let index = Arc::new(MemoryIndex::new());
        index.upsert(units).await.unwrap();
        Retriever::new(index, Arc::new(test_config()))
    }

    #[tokio::test]
    async fn matches_below_threshold_are_noise() {
        // cos(query, far) = 0.25 exactly: at/below the 0.3 gate.
        let retriever = retriever_with(vec![
            unit("near", vec![1.0, 0.0, 0.0]),
            unit("far", vec![0.25, (1.0f32 - 0.0625).sqrt(), 0.0]),
        ])
        .await;

        let matches = retriever.retrieve(&[1.0, 0.0, 0.0]).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "text of near");
        for m in &matches {
            assert!(m.score > 0.3);
        }
    }

    #[tokio::test]
    async fn ranking_order_is_preserved() {
        let retriever = retriever_with(vec![
            unit("third", vec![0.5, (1.0f32 - 0.25).sqrt(), 0.0]),
            unit("first", vec![1.0, 0.0, 0.0]),
            unit("second", vec![0.9, (1.0f32 - 0.81).sqrt(), 0.0]),
        ])
        .await;

        let matches = retriever.retrieve(&[1.0, 0.0, 0.0]).await.unwrap();
        let texts: Vec<&str> = matches.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["text of first", "text of second", "text of third"]);
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let retriever = retriever_with(vec![unit("orthogonal", vec![0.0, 1.0, 0.0])]).await;
        let matches = retriever.retrieve(&[1.0, 0.0, 0.0]).await.unwrap();
        assert!(matches.is_empty());
    }
}
