//! Extract command - map a single NFe file onto a record.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use nfex_core::nfe::{FieldMapper, FiscalExtractor};

use super::config;
use super::output::{key_from_path, render, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (NFe XML, wrapped JSON or provider JSON)
    #[arg(required = true)]
    input: PathBuf,

    /// Access key; overrides any key in the document
    #[arg(short, long)]
    key: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Include synthesized volumes
    #[arg(long)]
    volumes: bool,

    /// Report validation warnings
    #[arg(long)]
    validate: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = config::load(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Extracting from file: {}", args.input.display());

    let text = fs::read_to_string(&args.input)?;
    let key = args.key.clone().or_else(|| key_from_path(&args.input));

    let mapper = FieldMapper::from_config(&config.extraction);
    let result = mapper.extract_from_text(&text, key.as_deref())?;

    if args.validate && !result.warnings.is_empty() {
        eprintln!("{}", style("Validation issues:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let volumes = if args.volumes {
        result.document.synthesize_volumes(&config.volumes)
    } else {
        Vec::new()
    };

    let output = render(&result.document, &volumes, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!(
        "Extracted {} source in {}ms (total {:?})",
        result.source_kind,
        result.processing_time_ms,
        start.elapsed()
    );

    Ok(())
}
