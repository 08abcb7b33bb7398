//! Fixed ingredient list provider.
//!
//! Returns the same configured list for every product. It stands in for a
//! web search integration and keeps tests deterministic.

use super::IngredientSource;
use crate::config::IngredientSettings;
use crate::error::Result;
use async_trait::async_trait;
use tracing::debug;

/// Ingredient source that ignores the product name.
#[derive(Debug, Clone)]
pub struct StaticIngredientSource {
    ingredients: Vec<String>,
}

impl StaticIngredientSource {
    pub fn new(ingredients: Vec<String>) -> Self {
        Self { ingredients }
    }
}

impl Default for StaticIngredientSource {
    fn default() -> Self {
        Self::new(IngredientSettings::default().static_list)
    }
}

#[async_trait]
impl IngredientSource for StaticIngredientSource {
    async fn fetch(&self, product_name: &str) -> Result<Vec<String>> {
        debug!(
            "Returning {} static ingredients for {}",
            self.ingredients.len(),
            product_name
        );
        Ok(self.ingredients.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
