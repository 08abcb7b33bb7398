//! Vector index abstraction for SkinSafe.
//!
//! Provides a trait-based interface for different vector database backends.
//! Ingestion writes through a [`BatchUpserter`]; retrieval calls [`VectorIndex::query`].

mod memory;
mod pinecone;
mod sqlite;

pub use memory::MemoryVectorIndex;
pub use pinecone::PineconeIndex;
pub use sqlite::SqliteVectorIndex;

use crate::config::{Settings, VectorStoreProvider};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Largest batch Pinecone accepts per upsert request.
pub const MAX_UPSERT_BATCH: usize = 100;

/// Metadata stored alongside every chunk embedding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkMetadata {
    pub title: String,
    pub authors: String,
    pub year: String,
    pub source: String,
    #[serde(deserialize_with = "de_chunk_index")]
    pub chunk_index: usize,
    pub content_type: String,
    pub text: String,
}

/// Pinecone returns every number as a float.
fn de_chunk_index<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value < 0.0 || value.fract() != 0.0 {
        return Err(serde::de::Error::custom(format!(
            "chunk_index must be a non-negative integer, got {}",
            value
        )));
    }
    Ok(value as usize)
}

/// A chunk embedding with its id and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Unique per chunk; re-using an id overwrites the stored record.
    pub id: String,
    /// Embedding vector.
    pub values: Vec<f32>,
    pub metadata: ChunkMetadata,
}

impl VectorRecord {
    /// Deterministic record id for chunk `index` of a document.
    pub fn chunk_id(document_title: &str, index: usize) -> String {
        format!("{}_chunk_{}", document_title, index)
    }
}

/// A nearest-neighbour match.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    pub id: String,
    /// Similarity score (higher is better).
    pub score: f32,
    pub metadata: Option<ChunkMetadata>,
}

/// Trait for vector index implementations.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite records by id. Returns the number written.
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize>;

    /// Return up to `top_k` nearest records, best first, with metadata.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>>;

    /// Total number of stored records.
    async fn record_count(&self) -> Result<usize>;

    /// Backend name for logs and diagnostics.
    fn name(&self) -> &'static str;
}

/// Counts reported by [`BatchUpserter::finish`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertStats {
    pub records: usize,
    pub batches: usize,
}

/// Buffers records and sends them to the index in fixed-size batches.
///
/// A failed flush is returned to the caller and the buffered batch is dropped.
pub struct BatchUpserter<'a> {
    index: &'a dyn VectorIndex,
    batch_size: usize,
    buffer: Vec<VectorRecord>,
    stats: UpsertStats,
}

impl<'a> BatchUpserter<'a> {
    /// `batch_size` is clamped to `1..=MAX_UPSERT_BATCH`.
    pub fn new(index: &'a dyn VectorIndex, batch_size: usize) -> Self {
        let batch_size = batch_size.clamp(1, MAX_UPSERT_BATCH);
        Self {
            index,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            stats: UpsertStats::default(),
        }
    }

    /// Add a record, flushing when the batch is full.
    pub async fn push(&mut self, record: VectorRecord) -> Result<()> {
        self.buffer.push(record);
        if self.buffer.len() >= self.batch_size {
            self.flush().await?;
        }
        Ok(())
    }

    /// Send any buffered records now.
    pub async fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.buffer);
        debug!("Upserting batch of {} records to {}", batch.len(), self.index.name());
        self.index.upsert(&batch).await?;
        self.stats.records += batch.len();
        self.stats.batches += 1;
        Ok(())
    }

    /// Flush the remainder and report totals.
    pub async fn finish(mut self) -> Result<UpsertStats> {
        self.flush().await?;
        info!(
            "Upserted {} records in {} batches",
            self.stats.records, self.stats.batches
        );
        Ok(self.stats)
    }

    /// Records currently buffered.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// Create the configured vector index.
pub async fn create_index(settings: &Settings) -> Result<Arc<dyn VectorIndex>> {
    let index: Arc<dyn VectorIndex> = match settings.vector_store.provider {
        VectorStoreProvider::Pinecone => {
            Arc::new(PineconeIndex::connect(&settings.vector_store).await?)
        }
        VectorStoreProvider::Sqlite => Arc::new(SqliteVectorIndex::new(&settings.sqlite_path())?),
        VectorStoreProvider::Memory => Arc::new(MemoryVectorIndex::new()),
    };
    Ok(index)
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
