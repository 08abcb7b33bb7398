//! SQLite-based vector index implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! Intended for offline use and small literature collections; large
//! collections belong in a managed index.

use super::{cosine_similarity, ChunkMetadata, QueryMatch, VectorIndex, VectorRecord};
use crate::error::{Result, SkinsafeError};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS vectors (
        id TEXT PRIMARY KEY,
        embedding BLOB NOT NULL,
        metadata TEXT NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_vectors_indexed_at ON vectors(indexed_at);
"#;

/// SQLite-based vector index.
pub struct SqliteVectorIndex {
    conn: Mutex<Connection>,
}

impl SqliteVectorIndex {
    /// Open (or create) a SQLite vector index at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector index at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector index (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SkinsafeError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        let indexed_at = Utc::now().to_rfc3339();

        for record in records {
            let metadata = serde_json::to_string(&record.metadata)?;
            tx.execute(
                r#"
                INSERT OR REPLACE INTO vectors (id, embedding, metadata, indexed_at)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    record.id,
                    Self::embedding_to_bytes(&record.values),
                    metadata,
                    indexed_at,
                ],
            )?;
        }

        tx.commit()?;
        debug!("Upserted {} records", records.len());
        Ok(records.len())
    }

    #[instrument(skip(self, vector))]
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, embedding, metadata FROM vectors")?;

        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let embedding: Vec<u8> = row.get(1)?;
            let metadata: String = row.get(2)?;
            Ok((id, embedding, metadata))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (id, embedding, metadata) = row?;
            let metadata = match serde_json::from_str::<ChunkMetadata>(&metadata) {
                Ok(m) => Some(m),
                Err(e) => {
                    warn!("Ignoring unreadable metadata for {}: {}", id, e);
                    None
                }
            };
            results.push(QueryMatch {
                score: cosine_similarity(vector, &Self::bytes_to_embedding(&embedding)),
                id,
                metadata,
            });
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        debug!("Found {} matching records", results.len());
        Ok(results)
    }

    async fn record_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM vectors", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::tests::record;

    #[tokio::test]
    async fn test_sqlite_vector_index() {
        let index = SqliteVectorIndex::in_memory().unwrap();

        let written = index
            .upsert(&[
                record("paper_chunk_0", vec![1.0, 0.0, 0.0]),
                record("paper_chunk_1", vec![0.0, 1.0, 0.0]),
            ])
            .await
            .unwrap();
        assert_eq!(written, 2);

        let results = index.query(&[1.0, 0.0, 0.0], 5).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "paper_chunk_0");
        assert!((results[0].score - 1.0).abs() < 0.001);

        let meta = results[0].metadata.as_ref().unwrap();
        assert_eq!(meta.text, "text of paper_chunk_0");
        assert_eq!(meta.source, "PDF literature");
    }

    #[tokio::test]
    async fn test_reingest_overwrites() {
        let index = SqliteVectorIndex::in_memory().unwrap();
        index.upsert(&[record("x_chunk_0", vec![1.0, 0.0])]).await.unwrap();
        index.upsert(&[record("x_chunk_0", vec![0.0, 1.0])]).await.unwrap();

        assert_eq!(index.record_count().await.unwrap(), 1);
        let results = index.query(&[0.0, 1.0], 1).await.unwrap();
        assert!((results[0].score - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_on_disk_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vectors.db");
        {
            let index = SqliteVectorIndex::new(&path).unwrap();
            index.upsert(&[record("d_chunk_0", vec![1.0])]).await.unwrap();
        }
        let reopened = SqliteVectorIndex::new(&path).unwrap();
        assert_eq!(reopened.record_count().await.unwrap(), 1);
    }
}
