use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Commands;
use ndmkit::options::DecodeOptions;

#[derive(Parser)]
#[command(name = "ndm")]
#[command(about = "NDM model inspector and exporter", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML file with decoder overrides
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log decoder decisions (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let options = match &cli.config {
        Some(path) => {
            let options = DecodeOptions::load(path)?;
            tracing::info!("Loaded decoder options from {}", path.display());
            options
        }
        None => DecodeOptions::default(),
    };
    tracing::debug!("Decoder options: {:?}", options);
    cli.command.execute(&options)?;

    Ok(())
}
