//! PDF literature ingestion.
//!
//! Extracts text and citation metadata from each PDF in a folder, chunks it
//! by tokens, embeds every chunk and upserts the records in batches.

use crate::chunking::{ChunkingConfig, TiktokenCodec, TokenChunker};
use crate::config::{IngestionSettings, Settings};
use crate::document::{fallback_title, CitationMetadata, DocumentParser, PdfParser};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, SkinsafeError};
use crate::vector_store::{create_index, BatchUpserter, ChunkMetadata, VectorIndex, VectorRecord};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Options applied to every ingested document.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Read citation fields from the document instead of using the file name.
    pub extract_metadata: bool,
    pub source_label: String,
    pub content_type: String,
    pub batch_size: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for IngestOptions {
    fn from(settings: &Settings) -> Self {
        let IngestionSettings {
            extract_metadata,
            source_label,
            content_type,
            ..
        } = &settings.ingestion;

        Self {
            extract_metadata: *extract_metadata,
            source_label: source_label.clone(),
            content_type: content_type.clone(),
            batch_size: settings.vector_store.upsert_batch_size,
        }
    }
}

/// Totals for one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub chunks_indexed: usize,
    pub batches_flushed: usize,
}

/// PDF files found in a folder, plus how many other entries were passed over.
#[derive(Debug, Clone, Default)]
pub struct FolderScan {
    pub files: Vec<PathBuf>,
    pub skipped: usize,
}

/// List the `.pdf` files directly inside `folder`, sorted by name.
pub fn scan_folder(folder: &Path) -> Result<FolderScan> {
    if !folder.is_dir() {
        return Err(SkinsafeError::InvalidInput(format!(
            "PDF folder not found: {}",
            folder.display()
        )));
    }

    let mut scan = FolderScan::default();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        if path.is_file() && PdfParser::is_pdf(&path) {
            scan.files.push(path);
        } else {
            scan.skipped += 1;
        }
    }
    scan.files.sort();

    debug!(
        "Found {} PDF files in {} ({} other entries)",
        scan.files.len(),
        folder.display(),
        scan.skipped
    );
    Ok(scan)
}

/// The ingestion pipeline with its injected clients.
pub struct Ingestor {
    parser: Arc<dyn DocumentParser>,
    chunker: TokenChunker,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    options: IngestOptions,
}

impl Ingestor {
    /// Build an ingestor from settings with the real PDF parser and service clients.
    pub async fn new(settings: &Settings) -> Result<Self> {
        let codec = Arc::new(TiktokenCodec::new(&settings.chunking.encoding)?);
        debug!("Tokenizing with {}", codec.encoding());
        let chunker = TokenChunker::new(codec, ChunkingConfig::from(&settings.chunking))?;
        let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
        let index = create_index(settings).await?;

        Ok(Self::with_components(
            Arc::new(PdfParser::new()),
            chunker,
            embedder,
            index,
            IngestOptions::from(settings),
        ))
    }

    /// Create an ingestor with custom components.
    pub fn with_components(
        parser: Arc<dyn DocumentParser>,
        chunker: TokenChunker,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        options: IngestOptions,
    ) -> Self {
        Self {
            parser,
            chunker,
            embedder,
            index,
            options,
        }
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// The index records are written to.
    pub fn index(&self) -> Arc<dyn VectorIndex> {
        self.index.clone()
    }

    /// A batch writer over this ingestor's index.
    pub fn upserter(&self) -> BatchUpserter<'_> {
        BatchUpserter::new(self.index.as_ref(), self.options.batch_size)
    }

    /// Ingest every PDF directly inside `folder`.
    #[instrument(skip(self), fields(folder = %folder.display()))]
    pub async fn ingest_folder(&self, folder: &Path) -> Result<IngestReport> {
        let scan = scan_folder(folder)?;
        info!("Ingesting {} PDF files", scan.files.len());

        let mut upserter = self.upserter();
        let mut report = IngestReport {
            files_skipped: scan.skipped,
            ..Default::default()
        };

        for path in &scan.files {
            report.chunks_indexed += self.ingest_file(path, &mut upserter).await?;
            report.files_processed += 1;
        }

        let stats = upserter.finish().await?;
        report.batches_flushed = stats.batches;

        info!(
            "Ingested {} chunks from {} files",
            report.chunks_indexed, report.files_processed
        );
        Ok(report)
    }

    /// Chunk, embed and queue one document. Returns the number of chunks queued.
    #[instrument(skip(self, upserter), fields(file = %path.display()))]
    pub async fn ingest_file(&self, path: &Path, upserter: &mut BatchUpserter<'_>) -> Result<usize> {
        let id_title = fallback_title(path);
        let citation = self.citation(path, &id_title)?;
        debug!(
            "Citation: {} / {} / {}",
            citation.title, citation.authors, citation.year
        );

        let text = self.parser.extract_text(path)?;
        let chunks = self.chunker.chunk_text(&text)?;
        if chunks.is_empty() {
            warn!("No text chunks produced for {}", path.display());
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(SkinsafeError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let count = chunks.len();
        for (chunk, values) in chunks.into_iter().zip(embeddings) {
            upserter
                .push(VectorRecord {
                    id: VectorRecord::chunk_id(&id_title, chunk.order),
                    values,
                    metadata: ChunkMetadata {
                        title: citation.title.clone(),
                        authors: citation.authors.clone(),
                        year: citation.year.clone(),
                        source: self.options.source_label.clone(),
                        chunk_index: chunk.order,
                        content_type: self.options.content_type.clone(),
                        text: chunk.content,
                    },
                })
                .await?;
        }

        info!("Queued {} chunks from {}", count, path.display());
        Ok(count)
    }

    fn citation(&self, path: &Path, fallback: &str) -> Result<CitationMetadata> {
        if !self.options.extract_metadata {
            return Ok(CitationMetadata::fallback(fallback));
        }
        let meta = self.parser.extract_metadata(path)?;
        Ok(CitationMetadata::from_metadata(&meta, fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::fake::CharCodec;
    use crate::document::{DocumentMetadata, NO_DATE, UNKNOWN_AUTHORS};
    use crate::embedding::fake::HashEmbedder;
    use crate::vector_store::tests::RecordingIndex;
    use crate::vector_store::MemoryVectorIndex;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Serves text and metadata from memory, keyed by file name.
    #[derive(Default)]
    struct FakeParser {
        texts: HashMap<String, String>,
        metadata: DocumentMetadata,
    }

    impl FakeParser {
        fn key(path: &Path) -> String {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        }
    }

    impl DocumentParser for FakeParser {
        fn extract_text(&self, path: &Path) -> Result<String> {
            self.texts
                .get(&Self::key(path))
                .cloned()
                .ok_or_else(|| SkinsafeError::Document(format!("unreadable: {:?}", path)))
        }

        fn extract_metadata(&self, _path: &Path) -> Result<DocumentMetadata> {
            Ok(self.metadata.clone())
        }
    }

    fn touch(dir: &TempDir, name: &str) {
        std::fs::write(dir.path().join(name), b"%PDF-1.4").unwrap();
    }

    fn ingestor(
        parser: FakeParser,
        index: Arc<dyn VectorIndex>,
        chunk_size: usize,
        extract_metadata: bool,
    ) -> Ingestor {
        let chunker = TokenChunker::new(
            Arc::new(CharCodec),
            ChunkingConfig {
                chunk_size,
                overlap: 0,
            },
        )
        .unwrap();
        let options = IngestOptions {
            extract_metadata,
            ..Default::default()
        };
        Ingestor::with_components(
            Arc::new(parser),
            chunker,
            Arc::new(HashEmbedder::default()),
            index,
            options,
        )
    }

    #[test]
    fn test_scan_folder_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "b_paper.pdf");
        touch(&dir, "A_review.PDF");
        touch(&dir, "notes.txt");
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let scan = scan_folder(dir.path()).unwrap();
        let names: Vec<String> = scan.files.iter().map(|p| FakeParser::key(p)).collect();
        assert_eq!(names, vec!["A_review.PDF", "b_paper.pdf"]);
        assert_eq!(scan.skipped, 2);
    }

    #[test]
    fn test_missing_folder_is_error() {
        let dir = TempDir::new().unwrap();
        let err = scan_folder(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, SkinsafeError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_large_document_is_batched() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "sls_study.pdf");
        let parser = FakeParser {
            texts: HashMap::from([("sls_study.pdf".to_string(), "x".repeat(250))]),
            ..Default::default()
        };
        let index = Arc::new(RecordingIndex::default());

        let report = ingestor(parser, index.clone(), 1, false)
            .ingest_folder(dir.path())
            .await
            .unwrap();

        assert_eq!(report.chunks_indexed, 250);
        assert_eq!(report.batches_flushed, 3);
        assert_eq!(index.batch_sizes(), vec![100, 100, 50]);

        let batches = index.batches.lock().unwrap();
        assert_eq!(batches[0][0].id, "sls study_chunk_0");
        assert_eq!(batches[2][49].id, "sls study_chunk_249");
        assert_eq!(batches[2][49].metadata.chunk_index, 249);
    }

    #[tokio::test]
    async fn test_metadata_flag() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "fragrance_allergy.pdf");
        let metadata = DocumentMetadata {
            title: Some("Fragrance Contact Allergy".to_string()),
            author: Some("J. Doe".to_string()),
            creation_date: Some("D:20180101000000".to_string()),
        };

        for extract in [true, false] {
            let parser = FakeParser {
                texts: HashMap::from([(
                    "fragrance_allergy.pdf".to_string(),
                    "fragrance mix".to_string(),
                )]),
                metadata: metadata.clone(),
            };
            let index = Arc::new(MemoryVectorIndex::new());
            ingestor(parser, index.clone(), 100, extract)
                .ingest_folder(dir.path())
                .await
                .unwrap();

            let record = index.get("fragrance allergy_chunk_0").unwrap().unwrap();
            assert_eq!(record.metadata.source, "PDF literature");
            assert_eq!(record.metadata.content_type, "ingredient safety research");
            assert_eq!(record.metadata.text, "fragrance mix");
            if extract {
                assert_eq!(record.metadata.title, "Fragrance Contact Allergy");
                assert_eq!(record.metadata.authors, "J. Doe");
                assert_eq!(record.metadata.year, "2018");
            } else {
                assert_eq!(record.metadata.title, "fragrance allergy");
                assert_eq!(record.metadata.authors, UNKNOWN_AUTHORS);
                assert_eq!(record.metadata.year, NO_DATE);
            }
        }
    }

    #[tokio::test]
    async fn test_reingest_overwrites() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "paper.pdf");
        let index = Arc::new(MemoryVectorIndex::new());

        for _ in 0..2 {
            let parser = FakeParser {
                texts: HashMap::from([("paper.pdf".to_string(), "abcdefghij".to_string())]),
                ..Default::default()
            };
            ingestor(parser, index.clone(), 4, true)
                .ingest_folder(dir.path())
                .await
                .unwrap();
        }

        assert_eq!(index.record_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_empty_text_is_processed_without_chunks() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "scanned.pdf");
        let parser = FakeParser {
            texts: HashMap::from([("scanned.pdf".to_string(), String::new())]),
            ..Default::default()
        };
        let index = Arc::new(RecordingIndex::default());

        let report = ingestor(parser, index.clone(), 10, true)
            .ingest_folder(dir.path())
            .await
            .unwrap();

        assert_eq!(report.files_processed, 1);
        assert_eq!(report.chunks_indexed, 0);
        assert!(index.batch_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_extraction_failure_aborts() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "broken.pdf");
        let index = Arc::new(RecordingIndex::default());

        let err = ingestor(FakeParser::default(), index.clone(), 10, false)
            .ingest_folder(dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, SkinsafeError::Document(_)));
        assert!(index.batch_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_failed_flush_aborts() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.pdf");
        touch(&dir, "b.pdf");
        let parser = FakeParser {
            texts: HashMap::from([
                ("a.pdf".to_string(), "y".repeat(150)),
                ("b.pdf".to_string(), "z".repeat(150)),
            ]),
            ..Default::default()
        };
        let index = Arc::new(RecordingIndex {
            fail_on_call: Some(1),
            ..Default::default()
        });

        let result = ingestor(parser, index.clone(), 1, false)
            .ingest_folder(dir.path())
            .await;
        assert!(result.is_err());
        assert_eq!(index.batch_sizes(), vec![100]);
    }
}
