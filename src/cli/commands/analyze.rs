//! Analyze command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{AnalysisOutcome, AnalysisRequest, SafetyPipeline};
use crate::validation::{BrandMissing, BrandValidator};
use anyhow::Result;

/// Run the analyze command.
pub async fn run_analyze(
    product: &str,
    allergies: Vec<String>,
    conditions: Vec<String>,
    top_k: Option<usize>,
    model: Option<String>,
    json: bool,
    mut settings: Settings,
) -> Result<()> {
    // An unrecognised brand needs no credentials and no clients.
    if !BrandValidator::new(&settings.analysis.known_brands).brand_present(product) {
        print_outcome(
            product,
            &AnalysisOutcome::BrandMissing(BrandMissing::default()),
            json,
            &settings,
        )?;
        return Ok(());
    }

    if let Some(k) = top_k {
        settings.analysis.top_k = k;
    }
    if let Some(m) = model {
        settings.analysis.model = m;
    }

    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Analyze, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'skinsafe doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pipeline = SafetyPipeline::new(&settings).await?;
    let request = AnalysisRequest::new(product, allergies, conditions);

    let spinner = (!json).then(|| Output::spinner("Analyzing product..."));
    let outcome = pipeline.run_analysis(&request).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match outcome {
        Ok(outcome) => print_outcome(product, &outcome, json, &settings),
        Err(e) => {
            Output::error(&format!("Analysis failed: {}", e));
            Err(e.into())
        }
    }
}

fn print_outcome(product: &str, outcome: &AnalysisOutcome, json: bool, settings: &Settings) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    match outcome {
        AnalysisOutcome::BrandMissing(missing) => {
            Output::warning(&format!("{}: {}", missing.error, missing.message));
            Output::info(&format!(
                "Recognised brands: {}",
                settings.analysis.known_brands.join(", ")
            ));
        }
        AnalysisOutcome::Analysis(result) => {
            Output::verdict(product, result);
        }
    }
    Ok(())
}
