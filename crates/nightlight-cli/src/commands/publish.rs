//! Publish commands

use anyhow::{bail, Result};
use nightlight_core::models::MapIdentity;
use nightlight_sync::Orchestrator;

use super::parse_json_argument;
use crate::batch::BatchSummary;
use crate::cli::{MapArgs, PublishManyArgs};
use crate::output::OutputWriter;
use crate::output_types::{PublishManyOutput, PublishOutput};
use crate::progress;

pub async fn execute_one(args: MapArgs, orchestrator: &Orchestrator, output: &OutputWriter) -> Result<()> {
    let map: MapIdentity = parse_json_argument(&args.map)?;
    let key = map.canonical_key();
    tracing::info!(key = %key, "Publishing map");

    let spinner = progress::create_spinner(output, &format!("Publishing {}...", key));
    let entry = match orchestrator.publish_map(&map).await {
        Ok(entry) => {
            progress::finish_success(&spinner, &format!("Published {}", key));
            tracing::info!(key = %key, url = %entry.url, "Map published");
            entry
        }
        Err(e) => {
            progress::finish_error(&spinner, &format!("Failed to publish {}", key));
            return Err(e.into());
        }
    };

    if output.is_json() {
        return output.result(PublishOutput {
            key,
            url: entry.url,
            map: entry.identity,
        });
    }

    output.success(format!("Published {}", key));
    output.kv("URL", &entry.url);
    Ok(())
}

pub async fn execute_many(
    args: PublishManyArgs,
    orchestrator: &Orchestrator,
    output: &OutputWriter,
) -> Result<()> {
    let maps: Vec<MapIdentity> = parse_json_argument(&args.maps)?;
    if maps.is_empty() {
        output.info("No maps to publish");
        return Ok(());
    }

    let spinner = progress::create_spinner(output, &format!("Publishing {} maps...", maps.len()));
    tracing::info!(count = maps.len(), "Publishing maps");
    let report = orchestrator.publish_maps(maps).await;
    spinner.finish_and_clear();
    tracing::info!(
        published = report.succeeded.len(),
        failed = report.failed.len(),
        "Bulk publish finished"
    );

    let summary = BatchSummary::from(&report);
    if output.is_json() {
        output.result(PublishManyOutput::from(report))?;
    } else {
        summary.display(output);
    }

    if !summary.all_succeeded() {
        bail!(
            "{} of {} maps failed to publish",
            summary.failure_count(),
            summary.total
        );
    }
    Ok(())
}
