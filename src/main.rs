//! SkinSafe CLI entry point.

use anyhow::Result;
use clap::Parser;
use skinsafe::cli::{commands, Cli, Commands};
use skinsafe::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("skinsafe={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config_path = cli.config.as_ref().map(std::path::PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Ensure data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings).await?;
        }

        Commands::Analyze {
            product,
            allergies,
            conditions,
            top_k,
            model,
            json,
        } => {
            commands::run_analyze(
                product,
                allergies.clone(),
                conditions.clone(),
                *top_k,
                model.clone(),
                *json,
                settings,
            )
            .await?;
        }

        Commands::Ingest {
            folder,
            no_metadata,
            chunk_size,
            overlap,
        } => {
            commands::run_ingest(folder.clone(), *no_metadata, *chunk_size, *overlap, settings)
                .await?;
        }

        Commands::Search { query, top_k } => {
            commands::run_search(query, *top_k, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, config_path)?;
        }
    }

    Ok(())
}
