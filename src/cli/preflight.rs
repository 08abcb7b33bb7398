//! Pre-flight checks before expensive operations.
//!
//! Validates that required credentials and paths are available
//! before starting operations that would otherwise fail midway.

use crate::config::{Settings, VectorStoreProvider};
use crate::error::{Result, SkinsafeError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Analysis embeds the product name, queries the index and calls the chat model.
    Analyze,
    /// Ingestion requires the PDF folder, embeddings and the index.
    Ingest,
    /// Search requires embeddings and the index.
    Search,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    check_api_key()?;
    check_index_credentials(settings)?;

    if let Operation::Ingest = operation {
        check_pdf_folder(settings)?;
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(SkinsafeError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(SkinsafeError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Pinecone needs an API key; the local backends need nothing.
fn check_index_credentials(settings: &Settings) -> Result<()> {
    if settings.vector_store.provider != VectorStoreProvider::Pinecone {
        return Ok(());
    }
    match settings.vector_store.api_key.as_deref() {
        Some(key) if !key.is_empty() => Ok(()),
        _ => Err(SkinsafeError::Config(
            "PINECONE_API_KEY not set. Set it with: export PINECONE_API_KEY='...'".to_string(),
        )),
    }
}

fn check_pdf_folder(settings: &Settings) -> Result<()> {
    let folder = settings.pdf_folder();
    if folder.is_dir() {
        Ok(())
    } else {
        Err(SkinsafeError::Config(format!(
            "PDF folder not found: {}. Set ingestion.pdf_folder or SKINSAFE_PDF_FOLDER",
            folder.display()
        )))
    }
}
