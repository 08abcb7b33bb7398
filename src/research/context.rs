//! Context building for the analysis prompt.

use super::ResearchSnippet;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::VectorIndex;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Retrieves research snippets for a query.
pub struct ResearchRetriever {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl ResearchRetriever {
    /// Create a new retriever returning five snippets per query.
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index,
            embedder,
            top_k: 5,
        }
    }

    /// Set the number of snippets per query.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Embed `query` and return the nearest snippets, best first.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ResearchSnippet>> {
        self.retrieve_top(query, self.top_k).await
    }

    /// Like [`retrieve`](Self::retrieve) with an explicit result count.
    #[instrument(skip(self))]
    pub async fn retrieve_top(&self, query: &str, top_k: usize) -> Result<Vec<ResearchSnippet>> {
        let embedding = self.embedder.embed(query).await?;
        let matches = self.index.query(&embedding, top_k).await?;
        debug!("Retrieved {} research matches", matches.len());
        Ok(matches.into_iter().map(ResearchSnippet::from).collect())
    }

    /// Retrieve and format in one step.
    pub async fn retrieve_context(&self, query: &str) -> Result<String> {
        let snippets = self.retrieve(query).await?;
        Ok(format_research_context(&snippets))
    }
}

/// Render snippets as the text block passed verbatim to the model.
pub fn format_research_context(snippets: &[ResearchSnippet]) -> String {
    let mut context = String::new();
    for snippet in snippets {
        context.push_str(&format!("Source: {}\n", snippet.source));
        context.push_str(&format!("Text: {}\n", snippet.text));
        context.push_str(&format!("Score: {}\n\n", snippet.score));
    }
    context
}
