//! In-process vector index.
//!
//! Brute-force cosine similarity over a locked `Vec`. Used for local runs
//! and as the test double for the pipeline; not meant for large corpora.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::errors::PipelineError;
use super::{IndexedUnit, QueryMatch, VectorIndex};

pub struct MemoryIndex {
    units: RwLock<Vec<IndexedUnit>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self {
            units: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.units.read().expect("index lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn upsert(&self, new_units: Vec<IndexedUnit>) -> Result<(), PipelineError> {
        let mut units = self.units.write().expect("index lock poisoned");
        for unit in new_units {
            units.retain(|existing| existing.id != unit.id);
            units.push(unit);
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        with_metadata: bool,
    ) -> Result<Vec<QueryMatch>, PipelineError> {
        let units = self.units.read().expect("index lock poisoned");
        let mut matches: Vec<QueryMatch> = units
            .iter()
            .map(|unit| QueryMatch {
                id: unit.id.clone(),
                score: cosine_similarity(vector, &unit.values),
                metadata: with_metadata.then(|| unit.metadata.clone()),
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn delete(&self, id: &str) -> Result<(), PipelineError> {
        let mut units = self.units.write().expect("index lock poisoned");
        units.retain(|unit| unit.id != id);
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::UnitMetadata;

    fn unit(id: &str, values: Vec<f32>) -> IndexedUnit {
        IndexedUnit {
            id: id.to_string(),
            values,
            metadata: UnitMetadata {
                text: format!("text for {}", id),
                source: "test.txt".to_string(),
                timestamp: "2024-01-01T00:00:00.000Z".to_string(),
                length: 12,
            },
        }
    }

    #[tokio::test]
    async fn query_ranks_by_descending_similarity() {
        let index = MemoryIndex::new();
        index
            .upsert(vec![
                unit("far", vec![0.0, 1.0, 0.0]),
                unit("near", vec![1.0, 0.0, 0.0]),
                unit("mid", vec![0.7, 0.7, 0.0]),
            ])
            .await
            .unwrap();

        let matches = index.query(&[1.0, 0.0, 0.0], 3, true).await.unwrap();
        let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "far"]);
        for window in matches.windows(2) {
            assert!(window[0].score >= window[1].score);
        }
    }

    #[tokio::test]
    async fn query_respects_top_k_and_metadata_flag() {
        let index = MemoryIndex::new();
        index
            .upsert(vec![
                unit("a", vec![1.0, 0.0, 0.0]),
                unit("b", vec![0.0, 1.0, 0.0]),
            ])
            .await
            .unwrap();

        let matches = index.query(&[1.0, 0.0, 0.0], 1, false).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].metadata.is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_existing_id() {
        let index = MemoryIndex::new();
        index.upsert(vec![unit("a", vec![1.0, 0.0, 0.0])]).await.unwrap();
        index.upsert(vec![unit("a", vec![0.0, 1.0, 0.0])]).await.unwrap();
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let index = MemoryIndex::new();
        index.upsert(vec![unit("a", vec![1.0, 0.0, 0.0])]).await.unwrap();

        index.delete("a").await.unwrap();
        assert!(index.is_empty());
        // Second delete of the same id is a no-op, not an error.
        index.delete("a").await.unwrap();
        index.delete("never-existed").await.unwrap();
    }
}
