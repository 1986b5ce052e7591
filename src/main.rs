use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use tracing_subscriber::EnvFilter;

use ext4_recon::application::ListDirectoryUseCase;
use ext4_recon::application::dto::ListingOptions;
use ext4_recon::presentation::cli::{Cli, write_listing};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let options = ListingOptions::new(cli.image);
    let entries = ListDirectoryUseCase::new().execute(&options)?;

    let stdout = io::stdout();
    write_listing(&mut stdout.lock(), &entries).context("Failed to write listing")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
