//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Run the config command against `path`, or the default config file.
pub fn run_config(action: &ConfigAction, settings: Settings, path: Option<PathBuf>) -> Result<()> {
    let config_path = path.unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            // The Pinecone key is never serialized; say where it comes from instead.
            println!("{}", toml::to_string_pretty(&settings).context("Failed to serialize config")?);
            if settings.vector_store.api_key.is_some() {
                Output::kv("vector_store.api_key", "set from PINECONE_API_KEY");
            }
        }

        ConfigAction::Edit => edit(&config_path, &settings)?,

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Open the config in `$EDITOR`, then re-read it so syntax errors surface immediately.
fn edit(config_path: &PathBuf, settings: &Settings) -> Result<()> {
    if !config_path.exists() {
        settings.save_to(config_path)?;
        Output::info(&format!("Created default config at {}", config_path.display()));
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());
    Output::info(&format!("Opening config in {}...", editor));

    match std::process::Command::new(&editor).arg(config_path).status() {
        Ok(s) if s.success() => match Settings::load_from(Some(config_path)) {
            Ok(_) => Output::success("Config saved."),
            Err(e) => Output::error(&format!("Config saved but does not parse: {}", e)),
        },
        Ok(_) => Output::warning("Editor exited with non-zero status."),
        Err(e) => {
            Output::error(&format!("Failed to open editor: {}", e));
            Output::info(&format!("Config file is at: {}", config_path.display()));
        }
    }

    Ok(())
}
