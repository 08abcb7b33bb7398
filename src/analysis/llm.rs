//! Prompt rendering and reply parsing for the suitability verdict.

use super::{AnalysisResult, ChatModel};
use crate::config::Prompts;
use crate::error::{Result, SkinsafeError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Asks a chat model for a structured verdict.
pub struct LlmAnalyzer {
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
}

impl LlmAnalyzer {
    /// Create an analyzer with the default prompts.
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Render the user prompt for the given inputs.
    pub fn render_user_prompt(
        &self,
        ingredients: &[String],
        allergies: &[String],
        conditions: &[String],
        research: &str,
    ) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("ingredients".to_string(), serde_json::to_string(ingredients)?);
        vars.insert("allergies".to_string(), serde_json::to_string(allergies)?);
        vars.insert("conditions".to_string(), serde_json::to_string(conditions)?);
        vars.insert("research".to_string(), research.to_string());

        Ok(self
            .prompts
            .render_with_custom(&self.prompts.analysis.user, &vars))
    }

    /// Produce a verdict. A reply that is not strict JSON in the expected shape is an error.
    #[instrument(skip_all, fields(ingredients = ingredients.len()))]
    pub async fn analyze(
        &self,
        ingredients: &[String],
        allergies: &[String],
        conditions: &[String],
        research: &str,
    ) -> Result<AnalysisResult> {
        let user_prompt = self.render_user_prompt(ingredients, allergies, conditions, research)?;
        let system_prompt = self.prompts.render_with_custom(&self.prompts.analysis.system, &HashMap::new());

        info!("Requesting suitability verdict");
        let reply = self.model.complete(&system_prompt, &user_prompt).await?;
        debug!("Model reply: {}", reply);

        parse_reply(&reply)
    }
}

/// Parse the model's reply as an [`AnalysisResult`].
pub fn parse_reply(reply: &str) -> Result<AnalysisResult> {
    serde_json::from_str(reply).map_err(|e| SkinsafeError::MalformedResponse(e.to_string()))
}
