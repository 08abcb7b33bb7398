//! In-memory vector index implementation.
//!
//! Useful for testing and small datasets.

use super::{cosine_similarity, QueryMatch, VectorIndex, VectorRecord};
use crate::error::{Result, SkinsafeError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector index keyed by record id.
pub struct MemoryVectorIndex {
    records: RwLock<HashMap<String, VectorRecord>>,
}

impl MemoryVectorIndex {
    /// Create a new in-memory vector index.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch a record by id.
    pub fn get(&self, id: &str) -> Result<Option<VectorRecord>> {
        let records = self.records.read().map_err(lock_error)?;
        Ok(records.get(id).cloned())
    }
}

impl Default for MemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error<E: std::fmt::Display>(e: E) -> SkinsafeError {
    SkinsafeError::VectorStore(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        let mut store = self.records.write().map_err(lock_error)?;
        for record in records {
            store.insert(record.id.clone(), record.clone());
        }
        Ok(records.len())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>> {
        let records = self.records.read().map_err(lock_error)?;

        let mut results: Vec<QueryMatch> = records
            .values()
            .map(|record| QueryMatch {
                id: record.id.clone(),
                score: cosine_similarity(vector, &record.values),
                metadata: Some(record.metadata.clone()),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        Ok(results)
    }

    async fn record_count(&self) -> Result<usize> {
        let records = self.records.read().map_err(lock_error)?;
        Ok(records.len())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::tests::record;

    #[tokio::test]
    async fn test_memory_vector_index() {
        let index = MemoryVectorIndex::new();

        index
            .upsert(&[
                record("paper_chunk_0", vec![1.0, 0.0, 0.0]),
                record("paper_chunk_1", vec![0.0, 1.0, 0.0]),
            ])
            .await
            .unwrap();

        assert_eq!(index.record_count().await.unwrap(), 2);

        let results = index.query(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "paper_chunk_0");
        assert!(results[0].score > results[1].score);

        let top = index.query(&[0.0, 1.0, 0.0], 1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, "paper_chunk_1");
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let index = MemoryVectorIndex::new();
        index.upsert(&[record("a_chunk_0", vec![1.0, 0.0])]).await.unwrap();

        let mut replacement = record("a_chunk_0", vec![0.0, 1.0]);
        replacement.metadata.text = "updated".to_string();
        index.upsert(&[replacement]).await.unwrap();

        assert_eq!(index.record_count().await.unwrap(), 1);
        let stored = index.get("a_chunk_0").unwrap().unwrap();
        assert_eq!(stored.metadata.text, "updated");
        assert_eq!(stored.values, vec![0.0, 1.0]);
    }
}
