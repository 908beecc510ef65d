//! Fetch command - download an NFe from the provider API.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::ProgressBar;
use tracing::info;

use nfex_core::nfe::FieldMapper;
use nfex_core::provider::ProviderClient;

use super::config;
use super::output::{render, OutputFormat};

/// Environment variable read when the configuration carries no secret.
const SECRET_ENV: &str = "NFEX_PROVIDER_SECRET";

/// Arguments for the fetch command.
#[derive(Args)]
pub struct FetchArgs {
    /// 44-digit access key
    #[arg(required = true)]
    key: String,

    /// Output file for the record (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write the archival XML to this file
    #[arg(long)]
    xml_out: Option<PathBuf>,

    /// Include synthesized volumes
    #[arg(long)]
    volumes: bool,
}

pub async fn run(args: FetchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = config::load(config_path)?;

    if config.provider.client_secret.is_none() {
        config.provider.client_secret = std::env::var(SECRET_ENV).ok();
    }

    let mapper = FieldMapper::from_config(&config.extraction);
    let client = ProviderClient::new(config.provider.clone())?.with_mapper(mapper);

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("Fetching {}", args.key));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let fetched = match client.fetch(&args.key).await {
        Ok(fetched) => fetched,
        Err(e) => {
            spinner.finish_and_clear();
            for failure in e.failures() {
                eprintln!("  - {}", failure);
            }
            return Err(e.into());
        }
    };
    spinner.finish_and_clear();

    info!("Fetched {} via {}", fetched.document.chave_nota_fiscal, fetched.endpoint);

    for warning in &fetched.warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }

    if let Some(xml_path) = &args.xml_out {
        fs::write(xml_path, &fetched.xml)?;
        eprintln!("{} XML written to {}", style("✓").green(), xml_path.display());
    }

    let volumes = if args.volumes {
        fetched.document.synthesize_volumes(&config.volumes)
    } else {
        Vec::new()
    };

    let output = render(&fetched.document, &volumes, args.format)?;

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

    Ok(())
}
