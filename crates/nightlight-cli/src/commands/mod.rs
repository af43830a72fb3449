//! Command implementations

mod config;
mod delete;
mod list;
mod publish;
mod sync;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::errors;
use crate::output::OutputWriter;
use crate::storage;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Config => config::execute(&config, &output),
        Commands::ListRaw => {
            let orchestrator = storage::orchestrator(&config, false).await?;
            list::raw(&orchestrator, &config, &output).await
        }
        Commands::ListProcessed => {
            let orchestrator = storage::orchestrator(&config, false).await?;
            list::processed(&orchestrator, &config, &output).await
        }
        Commands::ListPublished => {
            let orchestrator = storage::orchestrator(&config, false).await?;
            list::published(&orchestrator, &output).await
        }
        Commands::Sync(args) => {
            let orchestrator = storage::orchestrator(&config, false).await?;
            sync::execute(args, &orchestrator, &output).await
        }
        // Only publish and delete talk to the tile host
        Commands::Publish(args) => {
            let orchestrator = storage::orchestrator(&config, true).await?;
            publish::execute_one(args, &orchestrator, &output).await
        }
        Commands::PublishMany(args) => {
            let orchestrator = storage::orchestrator(&config, true).await?;
            publish::execute_many(args, &orchestrator, &output).await
        }
        Commands::Delete(args) => {
            let orchestrator = storage::orchestrator(&config, true).await?;
            delete::execute(args, &orchestrator, &output).await
        }
    }
}

/// Parse a JSON argument, reading it from a file when it starts with `@`
fn parse_json_argument<T: DeserializeOwned>(argument: &str) -> Result<T> {
    let text = match argument.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path))?,
        None => argument.to_string(),
    };

    serde_json::from_str(&text).map_err(|e| errors::invalid_map_json(argument, &e).into())
}
