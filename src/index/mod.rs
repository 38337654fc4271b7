//! Vector index abstraction.
//!
//! The index is the only durable state in the system. It is consumed
//! through the [`VectorIndex`] trait: batch upsert, nearest-neighbor query
//! and delete-by-id. `MemoryIndex` serves local runs and tests;
//! `VectorizeIndex` talks to Cloudflare Vectorize over HTTP.

mod memory;
mod vectorize;

pub use memory::MemoryIndex;
pub use vectorize::VectorizeIndex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;

/// Metadata attached to every stored unit.
///
/// The key set is a deployed wire contract: exactly `text`, `source`,
/// `timestamp`, `length`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitMetadata {
    pub text: String,
    #[serde(default)]
    pub source: String,
    pub timestamp: String,
    pub length: usize,
}

/// The persisted retrievable record: id, embedding vector and metadata.
///
/// Ids are stable for the record's lifetime; there is no update-in-place,
/// re-ingestion creates new ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedUnit {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: UnitMetadata,
}

/// One ranked result of a similarity query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    pub score: f64,
    pub metadata: Option<UnitMetadata>,
}

/// Abstract contract for similarity-searchable vector storage.
///
/// Any failure is fatal to the enclosing pipeline operation; retry policy,
/// if any, belongs to the implementation or the caller.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Store a batch of units. One ingestion produces exactly one batch.
    async fn upsert(&self, units: Vec<IndexedUnit>) -> Result<(), PipelineError>;

    /// Return the `top_k` nearest neighbors, best first.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        with_metadata: bool,
    ) -> Result<Vec<QueryMatch>, PipelineError>;

    /// Delete a unit by id. Deleting a missing id is not an error.
    async fn delete(&self, id: &str) -> Result<(), PipelineError>;
}
