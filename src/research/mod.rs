//! Research retrieval from the literature index.
//!
//! Embeds a query, looks up the nearest literature chunks, and renders them
//! as the plain-text block the analysis prompt consumes.

mod context;

pub use context::{format_research_context, ResearchRetriever};

use crate::vector_store::QueryMatch;
use serde::{Deserialize, Serialize};

/// Source label used when a match carries no metadata.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// A retrieved passage of supporting research.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchSnippet {
    /// Where the passage came from.
    pub source: String,
    /// Passage text.
    pub text: String,
    /// Similarity score (higher is better).
    pub score: f32,
    /// Document title, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Publication year, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

impl From<QueryMatch> for ResearchSnippet {
    fn from(m: QueryMatch) -> Self {
        match m.metadata {
            Some(meta) => Self {
                source: if meta.source.is_empty() {
                    UNKNOWN_SOURCE.to_string()
                } else {
                    meta.source
                },
                text: meta.text,
                score: m.score,
                title: Some(meta.title).filter(|t| !t.is_empty()),
                year: Some(meta.year).filter(|y| !y.is_empty()),
            },
            None => Self {
                source: UNKNOWN_SOURCE.to_string(),
                text: String::new(),
                score: m.score,
                title: None,
                year: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::ChunkMetadata;

    #[test]
    fn test_snippet_from_match_with_metadata() {
        let snippet = ResearchSnippet::from(QueryMatch {
            id: "x_chunk_0".to_string(),
            score: 0.8,
            metadata: Some(ChunkMetadata {
                title: "Fragrance Allergy".to_string(),
                year: "2019".to_string(),
                source: "PDF literature".to_string(),
                text: "Fragrance mix is a top allergen.".to_string(),
                ..Default::default()
            }),
        });
        assert_eq!(snippet.source, "PDF literature");
        assert_eq!(snippet.title.as_deref(), Some("Fragrance Allergy"));
        assert_eq!(snippet.year.as_deref(), Some("2019"));
    }

    #[test]
    fn test_snippet_from_bare_match() {
        let snippet = ResearchSnippet::from(QueryMatch {
            id: "y".to_string(),
            score: 0.1,
            metadata: None,
        });
        assert_eq!(snippet.source, UNKNOWN_SOURCE);
        assert!(snippet.text.is_empty());
        assert!(snippet.title.is_none());
    }
}
