//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::research::ResearchRetriever;
use crate::vector_store::create_index;
use anyhow::Result;
use std::sync::Arc;

/// Run the search command.
pub async fn run_search(query: &str, top_k: Option<usize>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'skinsafe doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
    let index = create_index(&settings).await?;
    let retriever = ResearchRetriever::new(index, embedder)
        .with_top_k(top_k.unwrap_or(settings.analysis.top_k));

    let spinner = Output::spinner("Searching...");

    let results = retriever.retrieve(query).await;
    spinner.finish_and_clear();

    match results {
        Ok(snippets) => {
            if snippets.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} results", snippets.len()));

                for snippet in &snippets {
                    Output::search_result(snippet);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
