//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::ingest::{scan_folder, IngestReport, Ingestor};
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(
    folder: Option<String>,
    no_metadata: bool,
    chunk_size: Option<usize>,
    overlap: Option<usize>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(folder) = folder {
        settings.ingestion.pdf_folder = folder;
    }
    if no_metadata {
        settings.ingestion.extract_metadata = false;
    }
    if let Some(size) = chunk_size {
        settings.chunking.chunk_size = size;
    }
    if let Some(overlap) = overlap {
        settings.chunking.overlap = overlap;
    }

    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ingest, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'skinsafe doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let folder = settings.pdf_folder();
    let scan = scan_folder(&folder)?;
    if scan.files.is_empty() {
        Output::warning(&format!("No PDF files found in {}", folder.display()));
        return Ok(());
    }

    Output::info(&format!(
        "Ingesting {} PDF files from {}",
        scan.files.len(),
        folder.display()
    ));

    let ingestor = Ingestor::new(&settings).await?;
    let mut upserter = ingestor.upserter();
    let mut report = IngestReport {
        files_skipped: scan.skipped,
        ..Default::default()
    };

    let pb = Output::progress_bar(scan.files.len() as u64, "");
    for path in &scan.files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        pb.set_message(name.clone());

        match ingestor.ingest_file(path, &mut upserter).await {
            Ok(chunks) => {
                if chunks == 0 {
                    pb.println(format!("   no text extracted from {}", name));
                }
                report.chunks_indexed += chunks;
                report.files_processed += 1;
            }
            Err(e) => {
                pb.abandon();
                Output::error(&format!("Failed to ingest {}: {}", name, e));
                return Err(e.into());
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let spinner = Output::spinner("Flushing remaining records...");
    let stats = upserter.finish().await;
    spinner.finish_and_clear();
    report.batches_flushed = stats?.batches;

    Output::success(&format!(
        "Indexed {} chunks from {} files",
        report.chunks_indexed, report.files_processed
    ));
    Output::kv("Batches", &report.batches_flushed.to_string());
    Output::kv("Skipped entries", &report.files_skipped.to_string());
    Output::kv(
        "Index",
        &format!(
            "{} ({})",
            settings.vector_store.index_name, settings.vector_store.provider
        ),
    );

    Ok(())
}
