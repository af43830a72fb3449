//! Nightlight CLI - Command-line interface
//!
//! Lists, syncs, publishes and deletes nightlight maps.

mod batch;
mod cli;
mod commands;
mod config_loader;
mod errors;
mod output;
mod output_types;
mod progress;
mod storage;

use clap::Parser;
use cli::Cli;

fn main() {
    // Logs go to stderr so `--json` output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = tokio::runtime::Runtime::new()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(commands::execute(cli)));

    if let Err(error) = result {
        errors::from_anyhow(error).display();
        std::process::exit(1);
    }
}
