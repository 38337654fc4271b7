//! Document registry view.
//!
//! Derived entirely from vector index contents; there is no separate
//! document store. Listing is a bounded best-effort snapshot: it issues a
//! broad zero-vector query and the index's native result cap bounds the
//! count. It is NOT a complete enumeration.

use std::sync::Arc;

use serde::Serialize;

use crate::config::AppConfig;
use crate::errors::PipelineError;
use crate::index::VectorIndex;

/// How many characters of a unit's text survive into its listing preview.
const PREVIEW_LEN: usize = 200;

#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub source: String,
    pub text: String,
    pub timestamp: String,
    pub length: usize,
}

pub struct DocumentRegistry {
    index: Arc<dyn VectorIndex>,
    config: Arc<AppConfig>,
}

impl DocumentRegistry {
    pub fn new(index: Arc<dyn VectorIndex>, config: Arc<AppConfig>) -> Self {
        Self { index, config }
    }

    /// Snapshot of indexed units, capped at the configured listing limit.
    pub async fn list_documents(&self) -> Result<Vec<DocumentSummary>, PipelineError> {
        let probe = vec![0.0f32; self.config.dimension];
        let matches = self
            .index
            .query(&probe, self.config.list_limit, true)
            .await?;

        Ok(matches
            .into_iter()
            .filter_map(|m| {
                let metadata = m.metadata?;
                let preview: String = metadata.text.chars().take(PREVIEW_LEN).collect();
                Some(DocumentSummary {
                    id: m.id,
                    source: metadata.source,
                    text: format!("{}...", preview),
                    timestamp: metadata.timestamp,
                    length: metadata.length,
                })
            })
            .collect())
    }

    /// Delete a unit by id. Idempotent: a missing id deletes as a no-op
    /// and reports success, consistently.
    pub async fn delete_document(&self, id: &str) -> Result<(), PipelineError> {
        self.index.delete(id).await?;
        tracing::info!("Deleted document {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::index::{IndexedUnit, MemoryIndex, UnitMetadata, VectorIndex as _};
    use crate::rag::test_support::test_config;

    fn unit(id: &str, text: &str) -> IndexedUnit {
        IndexedUnit {
            id: id.to_string(),
            values: vec![1.0, 0.0, 0.0],
            metadata: UnitMetadata {
                text: text.to_string(),
                source: "doc.txt".to_string(),
                timestamp: "2024-01-01T00:00:00.000Z".to_string(),
                length: text.chars().count(),
            },
        }
    }

    async fn registry_with(units: Vec<IndexedUnit>) -> (DocumentRegistry, Arc<MemoryIndex>) {
        let index = Arc::new(MemoryIndex::new());
        index.upsert(units).await.unwrap();
        (
            DocumentRegistry::new(index.clone(), Arc::new(test_config())),
            index,
        )
    }

    #[tokio::test]
    async fn listing_projects_previews() {
        let long_text = "y".repeat(500);
        let (registry, _) = registry_with(vec![unit("a", &long_text)]).await;

        let documents = registry.list_documents().await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, "a");
        assert_eq!(documents[0].source, "doc.txt");
        assert_eq!(documents[0].length, 500);
        assert_eq!(documents[0].text.chars().count(), 203); // 200 + "..."
    }

    #[tokio::test]
    async fn listing_is_bounded_by_the_limit() {
        let units = (0..150)
            .map(|i| unit(&format!("u{}", i), "some indexed paragraph"))
            .collect();
        let (registry, _) = registry_with(units).await;

        let documents = registry.list_documents().await.unwrap();
        assert_eq!(documents.len(), 100);
    }

    #[tokio::test]
    async fn delete_twice_is_a_no_op_the_second_time() {
        let (registry, index) = registry_with(vec![unit("a", "some indexed paragraph")]).await;

        registry.delete_document("a").await.unwrap();
        assert!(index.is_empty());
        registry.delete_document("a").await.unwrap();
    }
}
