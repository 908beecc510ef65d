//! CLI application for Brazilian NFe field extraction.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, extract, fetch, key};

/// NFe extractor - Map Brazilian electronic invoices onto flat records
#[derive(Parser)]
#[command(name = "nfex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a record from a single NFe XML or JSON file
    Extract(extract::ExtractArgs),

    /// Extract records from multiple files
    Batch(batch::BatchArgs),

    /// Fetch an NFe from the provider API by access key
    Fetch(fetch::FetchArgs),

    /// Validate, format and decode an access key
    Key(key::KeyArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Extract(args) => extract::run(args, cli.config.as_deref()).await,
        Commands::Batch(args) => batch::run(args, cli.config.as_deref()).await,
        Commands::Fetch(args) => fetch::run(args, cli.config.as_deref()).await,
        Commands::Key(args) => key::run(args).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}
