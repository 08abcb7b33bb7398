//! Doctor command - verify credentials, index and ingestion configuration.

use crate::cli::Output;
use crate::config::{Settings, VectorStoreProvider};
use crate::ingest::scan_folder;
use crate::vector_store::create_index;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("SkinSafe Doctor");
    println!();
    println!("Checking credentials and configuration...\n");

    let mut checks = Vec::new();

    // Check API keys
    println!("{}", style("API Configuration").bold());
    let key_checks = vec![
        check_openai_api_key(std::env::var("OPENAI_API_KEY").ok().as_deref()),
        check_pinecone_api_key(settings),
    ];
    for check in &key_checks {
        check.print();
    }
    let keys_ok = key_checks.iter().all(|c| c.status != CheckStatus::Error);
    checks.extend(key_checks);

    println!();

    // Check the vector index
    println!("{}", style("Vector Index").bold());
    let index_checks = vec![
        check_index_config(settings),
        if keys_ok {
            check_index_reachable(settings).await
        } else {
            CheckResult::warning(
                "Connection",
                "skipped",
                "Fix the API key errors above first",
            )
        },
    ];
    for check in &index_checks {
        check.print();
    }
    checks.extend(index_checks);

    println!();

    // Check ingestion input
    println!("{}", style("Ingestion").bold());
    let folder_check = check_pdf_folder(settings);
    folder_check.print();
    checks.push(folder_check);

    println!();

    // Check configuration
    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using SkinSafe.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! SkinSafe is ready to use.");
    }

    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key(key: Option<&str>) -> CheckResult {
    match key {
        Some(key) if key.starts_with("sk-") && key.len() > 20 => {
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", mask(key)))
        }
        Some("") => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Some(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        None => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Check the Pinecone API key when Pinecone is the configured backend.
fn check_pinecone_api_key(settings: &Settings) -> CheckResult {
    if settings.vector_store.provider != VectorStoreProvider::Pinecone {
        return CheckResult::ok(
            "PINECONE_API_KEY",
            &format!("not needed ({} backend)", settings.vector_store.provider),
        );
    }
    match settings.vector_store.api_key.as_deref() {
        Some(key) if !key.is_empty() => {
            CheckResult::ok("PINECONE_API_KEY", &format!("configured ({})", mask(key)))
        }
        _ => CheckResult::error(
            "PINECONE_API_KEY",
            "not set",
            "Set with: export PINECONE_API_KEY='...'",
        ),
    }
}

/// Describe the configured index.
fn check_index_config(settings: &Settings) -> CheckResult {
    let vs = &settings.vector_store;
    match vs.provider {
        VectorStoreProvider::Pinecone if vs.index_name.trim().is_empty() => CheckResult::error(
            "Index",
            "no index name configured",
            "Set vector_store.index_name or PINECONE_INDEX_NAME",
        ),
        VectorStoreProvider::Pinecone => {
            let host = vs.host.as_deref().unwrap_or("resolved at startup");
            CheckResult::ok(
                "Index",
                &format!("pinecone '{}' (host: {})", vs.index_name, host),
            )
        }
        VectorStoreProvider::Sqlite => CheckResult::ok(
            "Index",
            &format!("sqlite {}", settings.sqlite_path().display()),
        ),
        VectorStoreProvider::Memory => CheckResult::warning(
            "Index",
            "memory (records are lost on exit)",
            "Use the pinecone or sqlite provider to keep ingested research",
        ),
    }
}

/// Open the index and count its records.
async fn check_index_reachable(settings: &Settings) -> CheckResult {
    let index = match create_index(settings).await {
        Ok(index) => index,
        Err(e) => {
            return CheckResult::error(
                "Connection",
                &e.to_string(),
                "Check the index name, host and API key",
            )
        }
    };

    match index.record_count().await {
        Ok(0) => CheckResult::warning(
            "Connection",
            "index is empty",
            "Ingest research papers with: skinsafe ingest",
        ),
        Ok(count) => CheckResult::ok("Connection", &format!("{} records indexed", count)),
        Err(e) => CheckResult::error(
            "Connection",
            &e.to_string(),
            "Check the index name, host and API key",
        ),
    }
}

/// Check the PDF folder and count the papers in it.
fn check_pdf_folder(settings: &Settings) -> CheckResult {
    let folder = settings.pdf_folder();
    match scan_folder(&folder) {
        Ok(scan) if scan.files.is_empty() => CheckResult::warning(
            "PDF folder",
            &format!("{} (no PDF files)", folder.display()),
            "Add research papers before running: skinsafe ingest",
        ),
        Ok(scan) => CheckResult::ok(
            "PDF folder",
            &format!("{} ({} PDF files)", folder.display(), scan.files.len()),
        ),
        Err(_) => CheckResult::warning(
            "PDF folder",
            &format!("{} (not found)", folder.display()),
            "Set ingestion.pdf_folder or SKINSAFE_PDF_FOLDER",
        ),
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: skinsafe config edit",
        )
    }
}

/// Show only the ends of a secret.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
