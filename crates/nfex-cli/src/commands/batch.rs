//! Batch command for multiple NFe files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use nfex_core::models::config::NfexConfig;
use nfex_core::nfe::{ExtractionResult, FieldMapper, FiscalExtractor};
use nfex_core::outcome::Outcome;
use nfex_core::NfexError;

use super::config;
use super::output::{csv_fields, key_from_path, render, OutputFormat, CSV_COLUMNS};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Include synthesized volumes in each output
    #[arg(long)]
    volumes: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome of one file.
struct FileOutcome {
    path: PathBuf,
    outcome: Outcome<ExtractionResult>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = config::load(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "xml" | "json")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mapper = FieldMapper::from_config(&config.extraction);
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let outcome: Outcome<ExtractionResult> = extract_file(&path, &mapper).into();
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        if !outcome.success {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", path.display(), outcome.message);
            } else {
                error!("Failed to process {}: {}", path.display(), outcome.message);
                pb.abandon();
                anyhow::bail!("Processing failed for {}: {}", path.display(), outcome.message);
            }
        }

        results.push(FileOutcome {
            path,
            outcome,
            processing_time_ms,
        });
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        write_outputs(output_dir, &results, &args, &config)?;
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| !r.outcome.success).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!("  - {}: {}", result.path.display(), result.outcome.message);
        }
    }

    Ok(())
}

fn extract_file(path: &Path, mapper: &FieldMapper) -> Result<ExtractionResult, NfexError> {
    let text = fs::read_to_string(path)?;
    let key = key_from_path(path);
    mapper.extract_from_text(&text, key.as_deref())
}

fn write_outputs(
    output_dir: &Path,
    results: &[FileOutcome],
    args: &BatchArgs,
    config: &NfexConfig,
) -> anyhow::Result<()> {
    for result in results {
        let Some(extraction) = &result.outcome.value else {
            continue;
        };

        let output_name = result
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("nfe");
        let output_path = output_dir.join(format!("{}.{}", output_name, args.format.extension()));

        let volumes = if args.volumes {
            extraction.document.synthesize_volumes(&config.volumes)
        } else {
            Vec::new()
        };

        let content = render(&extraction.document, &volumes, args.format)?;
        fs::write(&output_path, content)?;
        debug!("Wrote output to {}", output_path.display());
    }

    Ok(())
}

fn write_summary(path: &Path, results: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename", "status"];
    header.extend(CSV_COLUMNS);
    header.extend(["warnings", "processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let processing_time_ms = result.processing_time_ms.to_string();

        let mut record = vec![filename.to_string()];
        match &result.outcome.value {
            Some(extraction) => {
                record.push("success".to_string());
                record.extend(csv_fields(&extraction.document).map(str::to_string));
                record.push(extraction.warnings.join("; "));
                record.push(processing_time_ms);
                record.push(String::new());
            }
            None => {
                record.push("error".to_string());
                record.extend(CSV_COLUMNS.map(|_| String::new()));
                record.push(String::new());
                record.push(processing_time_ms);
                record.push(result.outcome.message.clone());
            }
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
