//! package-collection-generate CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pcg_cli::{Cli, generate};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    generate::generate(&cli).await
}
