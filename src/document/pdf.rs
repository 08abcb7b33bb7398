//! PDF text and metadata extraction.

use super::{DocumentMetadata, DocumentParser};
use crate::error::{Result, SkinsafeError};
use lopdf::{Dictionary, Object};
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Parser for PDF files.
pub struct PdfParser;

impl PdfParser {
    pub fn new() -> Self {
        Self
    }

    /// Whether the path has a `.pdf` extension (any case).
    pub fn is_pdf(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false)
    }

    /// Look up the trailer's Info dictionary, following an indirect reference.
    fn info_dictionary(doc: &lopdf::Document) -> Option<&Dictionary> {
        match doc.trailer.get(b"Info").ok()? {
            Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    fn info_string(dict: &Dictionary, key: &[u8]) -> Option<String> {
        match dict.get(key).ok()? {
            Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
            Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }
}

impl Default for PdfParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for PdfParser {
    #[instrument(skip(self))]
    fn extract_text(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)?;

        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            SkinsafeError::Document(format!("Failed to extract text from {:?}: {}", path, e))
        })?;

        if text.trim().is_empty() {
            warn!("{:?} contains no extractable text (may be image-based)", path);
        }

        debug!("Extracted {} characters from {:?}", text.len(), path);
        Ok(text)
    }

    #[instrument(skip(self))]
    fn extract_metadata(&self, path: &Path) -> Result<DocumentMetadata> {
        let doc = lopdf::Document::load(path).map_err(|e| {
            SkinsafeError::Document(format!("Failed to open {:?}: {}", path, e))
        })?;

        let Some(info) = Self::info_dictionary(&doc) else {
            debug!("{:?} has no info dictionary", path);
            return Ok(DocumentMetadata::default());
        };

        Ok(DocumentMetadata {
            title: Self::info_string(info, b"Title"),
            author: Self::info_string(info, b"Author"),
            creation_date: Self::info_string(info, b"CreationDate"),
        })
    }
}

/// Decode a PDF text string (UTF-16BE with BOM, UTF-8 with BOM, or PDFDocEncoding).
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    // PDFDocEncoding agrees with Latin-1 for printable text.
    bytes.iter().map(|&b| b as char).collect()
}
