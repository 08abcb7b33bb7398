//! Product analysis pipeline.
//!
//! Runs brand validation, ingredient lookup, research retrieval and the model
//! verdict strictly in sequence. Each stage's client is injected so tests can
//! substitute fakes.

use crate::analysis::{AnalysisResult, LlmAnalyzer, OpenAIChatModel};
use crate::config::{Prompts, Settings};
use crate::embedding::OpenAIEmbedder;
use crate::error::Result;
use crate::ingredients::{create_source, IngredientSource};
use crate::research::{format_research_context, ResearchRetriever};
use crate::validation::{BrandMissing, BrandValidator};
use crate::vector_store::create_index;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Input for one analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub product_name: String,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
}

impl AnalysisRequest {
    pub fn new(product_name: impl Into<String>, allergies: Vec<String>, conditions: Vec<String>) -> Self {
        Self {
            product_name: product_name.into(),
            allergies,
            conditions,
        }
    }
}

/// Result of one analysis: a verdict, or the brand-missing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    BrandMissing(BrandMissing),
    Analysis(AnalysisResult),
}

impl AnalysisOutcome {
    pub fn is_brand_missing(&self) -> bool {
        matches!(self, AnalysisOutcome::BrandMissing(_))
    }
}

/// The analysis pipeline with its injected clients.
pub struct SafetyPipeline {
    validator: BrandValidator,
    ingredients: Arc<dyn IngredientSource>,
    retriever: ResearchRetriever,
    analyzer: LlmAnalyzer,
}

impl SafetyPipeline {
    /// Build the pipeline from settings with the real service clients.
    pub async fn new(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
        let index = create_index(settings).await?;
        let chat = Arc::new(OpenAIChatModel::new(
            &settings.analysis.model,
            settings.analysis.temperature,
        )?);
        info!("Using chat model {}", chat.model());

        Ok(Self::with_components(
            BrandValidator::new(&settings.analysis.known_brands),
            create_source(&settings.ingredients)?,
            ResearchRetriever::new(index, embedder).with_top_k(settings.analysis.top_k),
            LlmAnalyzer::new(chat).with_prompts(prompts),
        ))
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        validator: BrandValidator,
        ingredients: Arc<dyn IngredientSource>,
        retriever: ResearchRetriever,
        analyzer: LlmAnalyzer,
    ) -> Self {
        Self {
            validator,
            ingredients,
            retriever,
            analyzer,
        }
    }

    /// Run the full analysis for one request.
    #[instrument(skip(self, request), fields(product = %request.product_name))]
    pub async fn run_analysis(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome> {
        if !self.validator.brand_present(&request.product_name) {
            info!("No known brand in product name");
            return Ok(AnalysisOutcome::BrandMissing(BrandMissing::default()));
        }

        let ingredients = self.ingredients.fetch(&request.product_name).await?;
        info!("Fetched {} ingredients from {}", ingredients.len(), self.ingredients.name());

        let snippets = self.retriever.retrieve(&request.product_name).await?;
        let research = format_research_context(&snippets);

        let result = self
            .analyzer
            .analyze(&ingredients, &request.allergies, &request.conditions, &research)
            .await?;

        Ok(AnalysisOutcome::Analysis(result))
    }

    /// Research retrieval on its own.
    pub fn retriever(&self) -> &ResearchRetriever {
        &self.retriever
    }
}
