//! Ingredient lookup for products.
//!
//! Provides a trait-based interface so a real search integration can replace
//! the static provider without touching the analysis pipeline.

mod static_list;

pub use static_list::StaticIngredientSource;

use crate::config::IngredientSettings;
use crate::error::{Result, SkinsafeError};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for ingredient list providers.
#[async_trait]
pub trait IngredientSource: Send + Sync {
    /// Return the ordered ingredient names for a product.
    async fn fetch(&self, product_name: &str) -> Result<Vec<String>>;

    /// Short provider name for logs and diagnostics.
    fn name(&self) -> &'static str;
}

/// Create an ingredient source from settings.
pub fn create_source(settings: &IngredientSettings) -> Result<Arc<dyn IngredientSource>> {
    match settings.provider.to_lowercase().as_str() {
        "static" => Ok(Arc::new(StaticIngredientSource::new(
            settings.static_list.clone(),
        ))),
        other => Err(SkinsafeError::Config(format!(
            "Unknown ingredient provider: {}",
            other
        ))),
    }
}
