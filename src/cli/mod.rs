//! CLI module for SkinSafe.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// SkinSafe - Skincare Product Safety Assistant
///
/// Checks whether a branded skincare product suits your allergies and skin
/// conditions, using a library of ingested dermatology research.
#[derive(Parser, Debug)]
#[command(name = "skinsafe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "SKINSAFE_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check API keys, index configuration and the PDF folder
    Doctor,

    /// Analyze a product for a user's allergies and skin conditions
    Analyze {
        /// Product name, including the brand (e.g. "CeraVe Foaming Cleanser")
        product: String,

        /// An allergy to check against (repeatable)
        #[arg(short, long = "allergy")]
        allergies: Vec<String>,

        /// A skin condition to check against (repeatable)
        #[arg(short = 'd', long = "condition")]
        conditions: Vec<String>,

        /// Number of research snippets to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Chat model to use for the verdict
        #[arg(short, long)]
        model: Option<String>,

        /// Print the raw JSON outcome
        #[arg(long)]
        json: bool,
    },

    /// Ingest a folder of PDF research papers into the vector index
    Ingest {
        /// Folder containing .pdf files
        #[arg(short, long)]
        folder: Option<String>,

        /// Skip PDF metadata; cite documents by file name
        #[arg(long)]
        no_metadata: bool,

        /// Tokens per chunk
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Tokens shared between consecutive chunks
        #[arg(long)]
        overlap: Option<usize>,
    },

    /// Search the indexed research literature
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_args() {
        let cli = Cli::parse_from([
            "skinsafe",
            "analyze",
            "Nivea Soft",
            "--allergy",
            "fragrance",
            "--allergy",
            "lanolin",
            "--condition",
            "eczema",
            "--json",
        ]);

        match cli.command {
            Commands::Analyze {
                product,
                allergies,
                conditions,
                json,
                top_k,
                ..
            } => {
                assert_eq!(product, "Nivea Soft");
                assert_eq!(allergies, vec!["fragrance", "lanolin"]);
                assert_eq!(conditions, vec!["eczema"]);
                assert!(json);
                assert!(top_k.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_ingest_args() {
        let cli = Cli::parse_from(["skinsafe", "-vv", "ingest", "--no-metadata", "--chunk-size", "400"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Ingest {
                folder,
                no_metadata,
                chunk_size,
                overlap,
            } => {
                assert!(folder.is_none());
                assert!(no_metadata);
                assert_eq!(chunk_size, Some(400));
                assert!(overlap.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
