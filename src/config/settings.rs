//! Configuration settings for SkinSafe.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub vector_store: VectorStoreSettings,
    pub ingestion: IngestionSettings,
    pub analysis: AnalysisSettings,
    pub ingredients: IngredientSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.skinsafe".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-large".to_string(),
            dimensions: 3072,
        }
    }
}

/// Token-window chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Tokens per chunk.
    pub chunk_size: usize,
    /// Tokens shared between consecutive chunks.
    pub overlap: usize,
    /// Tokenizer encoding name.
    pub encoding: String,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            overlap: 150,
            encoding: "cl100k_base".to_string(),
        }
    }
}

/// Vector store backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreProvider {
    /// Managed Pinecone index (default).
    #[default]
    Pinecone,
    /// Local SQLite file.
    Sqlite,
    /// Process-local, non-persistent.
    Memory,
}

impl std::str::FromStr for VectorStoreProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pinecone" => Ok(VectorStoreProvider::Pinecone),
            "sqlite" => Ok(VectorStoreProvider::Sqlite),
            "memory" => Ok(VectorStoreProvider::Memory),
            _ => Err(format!("Unknown vector store provider: {}", s)),
        }
    }
}

impl std::fmt::Display for VectorStoreProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorStoreProvider::Pinecone => write!(f, "pinecone"),
            VectorStoreProvider::Sqlite => write!(f, "sqlite"),
            VectorStoreProvider::Memory => write!(f, "memory"),
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (pinecone, sqlite, memory).
    pub provider: VectorStoreProvider,
    /// Pinecone index name. Overridden by `PINECONE_INDEX_NAME`.
    pub index_name: String,
    /// Pinecone index host. Resolved from the control plane when unset.
    /// Overridden by `PINECONE_HOST`.
    pub host: Option<String>,
    /// Pinecone namespace (empty for the default namespace).
    pub namespace: String,
    /// Pinecone API key. Usually supplied through `PINECONE_API_KEY`.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
    /// Maximum records per upsert request.
    pub upsert_batch_size: usize,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: VectorStoreProvider::Pinecone,
            index_name: "skincare-rag".to_string(),
            host: None,
            namespace: String::new(),
            api_key: None,
            sqlite_path: "~/.skinsafe/vectors.db".to_string(),
            upsert_batch_size: 100,
        }
    }
}

/// PDF ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionSettings {
    /// Folder scanned for `.pdf` files. Overridden by `SKINSAFE_PDF_FOLDER`.
    pub pdf_folder: String,
    /// Read title/author/creation date from the PDF info dictionary.
    pub extract_metadata: bool,
    /// Value stored in every record's `source` field.
    pub source_label: String,
    /// Value stored in every record's `content_type` field.
    pub content_type: String,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            pdf_folder: "./pdfs".to_string(),
            extract_metadata: true,
            source_label: "PDF literature".to_string(),
            content_type: "ingredient safety research".to_string(),
        }
    }
}

/// Product analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Brand substrings recognised in product names (case-insensitive).
    pub known_brands: Vec<String>,
    /// Chat model used for the verdict.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Number of research snippets retrieved per request.
    pub top_k: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            known_brands: vec![
                "pantene".to_string(),
                "cerave".to_string(),
                "la roche-posay".to_string(),
                "nivea".to_string(),
            ],
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            top_k: 5,
        }
    }
}

/// Ingredient source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngredientSettings {
    /// Ingredient source provider (static).
    pub provider: String,
    /// Ingredients returned by the static provider.
    pub static_list: Vec<String>,
}

impl Default for IngredientSettings {
    fn default() -> Self {
        Self {
            provider: "static".to_string(),
            static_list: vec![
                "Sodium Lauryl Sulfate".to_string(),
                "Fragrance".to_string(),
                "Cocamidopropyl Betaine".to_string(),
            ],
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment overrides are applied after the file is read.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Apply environment overrides using the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("PINECONE_API_KEY") {
            self.vector_store.api_key = Some(key);
        }
        if let Some(name) = non_empty("PINECONE_INDEX_NAME") {
            self.vector_store.index_name = name;
        }
        if let Some(host) = non_empty("PINECONE_HOST") {
            self.vector_store.host = Some(host);
        }
        if let Some(folder) = non_empty("SKINSAFE_PDF_FOLDER") {
            self.ingestion.pdf_folder = folder;
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SkinsafeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skinsafe")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }

    /// Get the expanded PDF folder path.
    pub fn pdf_folder(&self) -> PathBuf {
        Self::expand_path(&self.ingestion.pdf_folder)
    }
}
