//! Product suitability analysis with a chat model.

mod chat;
mod llm;

pub use chat::{ChatModel, OpenAIChatModel};
pub use llm::LlmAnalyzer;

use serde::{Deserialize, Serialize};

/// The model's verdict on a product for a particular user.
///
/// Every listed field must be present in the reply; any extra keys the model
/// adds are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub suitability_score: f64,
    pub is_suitable: bool,
    pub recommendation: String,
    pub explanation: String,
    pub allergy_notes: String,
    pub condition_notes: String,
    pub key_ingredients: Vec<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
pub(crate) mod fake {
    use super::ChatModel;
    use crate::error::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    pub(crate) const VALID_REPLY: &str = r#"{
        "summary": "Contains SLS and fragrance.",
        "suitability_score": 3,
        "is_suitable": false,
        "recommendation": "Avoid; choose a fragrance-free, sulfate-free shampoo.",
        "explanation": "SLS can aggravate eczema and fragrance is a listed allergy.",
        "allergy_notes": "Fragrance present.",
        "condition_notes": "SLS may worsen eczema.",
        "key_ingredients": ["Sodium Lauryl Sulfate", "Fragrance"]
    }"#;

    /// Returns a canned reply and records the prompts it was given.
    pub(crate) struct CannedChat {
        pub reply: String,
        pub prompts: Mutex<Vec<(String, String)>>,
    }

    impl CannedChat {
        pub fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatModel for CannedChat {
        async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
            self.prompts
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), user_prompt.to_string()));
            Ok(self.reply.clone())
        }
    }
}
