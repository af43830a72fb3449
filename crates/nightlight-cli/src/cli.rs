use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Nightlight - Sync, publish and delete nightlight maps
#[derive(Parser, Debug)]
#[command(name = "nightlight")]
#[command(about = "Sync, publish and delete nightlight maps", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./nightlight.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the buckets, queues, manifest and tilesets
    #[arg(long, global = true, value_name = "DIR")]
    pub data_root: Option<PathBuf>,

    /// Directory downloads are written to before upload
    #[arg(long, global = true, value_name = "DIR")]
    pub write_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List raw maps from the catalog's provider
    ListRaw,

    /// List processed maps
    ListProcessed,

    /// List published maps in manifest order
    ListPublished,

    /// Publish one processed map to the tile host
    Publish(MapArgs),

    /// Publish several maps concurrently
    PublishMany(PublishManyArgs),

    /// Delete a map from the tile host, manifest and both stores
    Delete(MapArgs),

    /// Request creation of catalog maps missing from the raw store
    Sync(SyncArgs),

    /// Show effective configuration values and where they came from
    Config,
}

#[derive(Parser, Debug)]
pub struct MapArgs {
    /// Map as JSON, or @FILE to read it from a file
    pub map: String,
}

#[derive(Parser, Debug)]
pub struct PublishManyArgs {
    /// JSON array of maps, or @FILE to read it from a file
    pub maps: String,
}

#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Region, e.g. ukraine_and_around
    #[arg(long)]
    pub bounds: String,

    /// Granularity, e.g. monthly
    #[arg(long)]
    pub map_type: String,

    /// Months to consider (comma-separated, 1-12)
    #[arg(long, value_delimiter = ',')]
    pub months: Vec<u32>,

    /// Years to consider (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub years: Vec<i32>,

    /// Show the maps that would be requested without enqueueing them
    #[arg(long)]
    pub dry_run: bool,
}
