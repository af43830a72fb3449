//! List commands

use anyhow::Result;
use nightlight_core::config::LayeredConfig;
use nightlight_core::models::{ManifestRecord, MapIdentity};
use nightlight_sync::Orchestrator;

use crate::output::OutputWriter;
use crate::output_types::{ListMapsOutput, ListPublishedOutput, MapRow, PublishedRow};

pub async fn raw(orchestrator: &Orchestrator, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let maps = orchestrator.list_raw().await?;
    show_maps(&config.raw_bucket.value, "Raw Maps", maps, output)
}

pub async fn processed(
    orchestrator: &Orchestrator,
    config: &LayeredConfig,
    output: &OutputWriter,
) -> Result<()> {
    let maps = orchestrator.list_processed().await?;
    show_maps(&config.processed_bucket.value, "Processed Maps", maps, output)
}

fn show_maps(bucket: &str, title: &str, maps: Vec<MapIdentity>, output: &OutputWriter) -> Result<()> {
    if output.is_json() {
        return output.result(ListMapsOutput {
            bucket: bucket.to_string(),
            maps,
        });
    }

    output.section(title);
    output.kv("Bucket", bucket);
    output.table(maps.iter().map(MapRow::from).collect());
    output.info(format!("{} map(s)", maps.len()));
    Ok(())
}

pub async fn published(orchestrator: &Orchestrator, output: &OutputWriter) -> Result<()> {
    let records: Vec<ManifestRecord> = orchestrator
        .list_published()
        .await?
        .iter()
        .map(ManifestRecord::from)
        .collect();

    if output.is_json() {
        return output.result(ListPublishedOutput { published: records });
    }

    output.section("Published Maps");
    output.table(records.iter().map(PublishedRow::from).collect());
    output.info(format!("{} map(s)", records.len()));
    Ok(())
}
