//! Configuration module for SkinSafe.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnalysisPrompts, Prompts};
pub use settings::{
    AnalysisSettings, ChunkingSettings, EmbeddingSettings, GeneralSettings, IngestionSettings,
    IngredientSettings, PromptSettings, Settings, VectorStoreProvider, VectorStoreSettings,
};
