//! Prompt templates for SkinSafe.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub analysis: AnalysisPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the product suitability verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPrompts {
    pub system: String,
    pub user: String,
}

impl Default for AnalysisPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a skincare safety expert.
Return ONLY valid JSON.
No markdown or extra text.
"#
            .to_string(),

            user: r#"Ingredients:
{{ingredients}}

User allergies:
{{allergies}}

User conditions:
{{conditions}}

Research snippets:
{{research}}

Return exactly this JSON schema:
{
  "summary": "",
  "suitability_score": 0,
  "is_suitable": false,
  "recommendation": "",
  "explanation": "",
  "allergy_notes": "",
  "condition_notes": "",
  "key_ingredients": []
}
"#
            .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let analysis_path = custom_path.join("analysis.toml");
            if analysis_path.exists() {
                let content = std::fs::read_to_string(&analysis_path)?;
                prompts.analysis = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Single left-to-right pass: substituted values are never scanned again,
    /// and unknown `{{name}}` placeholders are copied through unchanged.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            match after.find("}}").and_then(|end| vars.get(&after[..end]).map(|v| (end, v))) {
                Some((end, value)) => {
                    result.push_str(value);
                    rest = &after[end + 2..];
                }
                None => {
                    result.push_str("{{");
                    rest = after;
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
