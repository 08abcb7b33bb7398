//! Error types for SkinSafe.

use thiserror::Error;

/// Library-level error type for SkinSafe operations.
#[derive(Error, Debug)]
pub enum SkinsafeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ingredient lookup failed: {0}")]
    Ingredients(String),

    #[error("Document parsing failed: {0}")]
    Document(String),

    #[error("Chunking failed: {0}")]
    Chunking(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Pinecone API error ({status}): {body}")]
    Pinecone { status: u16, body: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for SkinSafe operations.
pub type Result<T> = std::result::Result<T, SkinsafeError>;
