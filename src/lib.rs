//! SkinSafe - Skincare Product Safety Assistant
//!
//! Tells a user whether a skincare product suits them, given their allergies
//! and skin conditions, grounded in indexed dermatology literature.
//!
//! # Overview
//!
//! SkinSafe allows you to:
//! - Ingest a folder of PDF research papers into a vector index
//! - Analyze a branded product against allergies and skin conditions
//! - Search the indexed literature directly
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `validation` - Brand recognition in product names
//! - `ingredients` - Ingredient list lookup
//! - `research` - Literature retrieval and context formatting
//! - `analysis` - Chat model verdicts
//! - `pipeline` - Analysis coordination
//! - `document` - PDF text and metadata extraction
//! - `chunking` - Token window chunking
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector index abstraction (Pinecone, SQLite, memory)
//! - `ingest` - PDF folder ingestion
//!
//! # Example
//!
//! ```rust,no_run
//! use skinsafe::config::Settings;
//! use skinsafe::pipeline::{AnalysisRequest, SafetyPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = SafetyPipeline::new(&settings).await?;
//!
//!     let request = AnalysisRequest::new(
//!         "CeraVe Hydrating Cleanser",
//!         vec!["fragrance".to_string()],
//!         vec!["eczema".to_string()],
//!     );
//!     let outcome = pipeline.run_analysis(&request).await?;
//!     println!("{}", serde_json::to_string_pretty(&outcome)?);
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod ingredients;
pub mod openai;
pub mod pipeline;
pub mod research;
pub mod validation;
pub mod vector_store;

pub use error::{Result, SkinsafeError};
