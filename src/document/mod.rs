//! Document parsing for literature ingestion.
//!
//! Extracts plain text and citation metadata from source documents.

mod pdf;

pub use pdf::PdfParser;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Author string used when a document carries no author metadata.
pub const UNKNOWN_AUTHORS: &str = "Unknown author(s)";

/// Year string used when a document carries no usable creation date.
pub const NO_DATE: &str = "n.d.";

/// Metadata as embedded in the document, before any fallback is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creation_date: Option<String>,
}

/// Citation fields attached to every chunk of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationMetadata {
    pub title: String,
    pub authors: String,
    pub year: String,
}

impl CitationMetadata {
    /// Citation used when metadata extraction is disabled.
    pub fn fallback(title: &str) -> Self {
        Self {
            title: title.to_string(),
            authors: UNKNOWN_AUTHORS.to_string(),
            year: NO_DATE.to_string(),
        }
    }

    /// Build a citation from raw metadata, falling back where fields are missing.
    pub fn from_metadata(meta: &DocumentMetadata, fallback_title: &str) -> Self {
        let non_empty = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            title: non_empty(&meta.title).unwrap_or_else(|| fallback_title.to_string()),
            authors: non_empty(&meta.author).unwrap_or_else(|| UNKNOWN_AUTHORS.to_string()),
            year: year_from_creation_date(meta.creation_date.as_deref()),
        }
    }
}

/// Take the year from a PDF date string such as `D:20191203101112`.
///
/// Only the length is checked; the characters at offsets 2..6 are returned as-is.
pub fn year_from_creation_date(date: Option<&str>) -> String {
    match date {
        Some(d) if d.chars().count() >= 6 => d.chars().skip(2).take(4).collect(),
        _ => NO_DATE.to_string(),
    }
}

/// Title derived from a file name: extension dropped, underscores as spaces.
pub fn fallback_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace('_', " "))
        .unwrap_or_else(|| "Untitled document".to_string())
}

/// Trait for document parsers.
pub trait DocumentParser: Send + Sync {
    /// Extract the full plain text of a document.
    fn extract_text(&self, path: &Path) -> Result<String>;

    /// Read embedded metadata. Missing fields are `None`.
    fn extract_metadata(&self, path: &Path) -> Result<DocumentMetadata>;
}
