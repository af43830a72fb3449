//! Sync command

use anyhow::Result;
use nightlight_core::models::identity::NamedVariant;
use nightlight_core::models::{Bounds, MapType, SelectedDateFilter, SyncRequest};
use nightlight_sync::Orchestrator;

use crate::cli::SyncArgs;
use crate::output::OutputWriter;
use crate::output_types::{MapRow, SyncOutput};

pub async fn execute(args: SyncArgs, orchestrator: &Orchestrator, output: &OutputWriter) -> Result<()> {
    let request = SyncRequest {
        bounds: Bounds::from(args.bounds.as_str()),
        map_type: MapType::from(args.map_type.as_str()),
        selected_dates: SelectedDateFilter::new(args.months, args.years),
    };

    tracing::info!(
        bounds = %request.bounds,
        map_type = %request.map_type,
        dry_run = args.dry_run,
        "Syncing with external catalog"
    );

    if args.dry_run {
        let maps = orchestrator.find_new_maps(&request).await?;
        if output.is_json() {
            return output.result(SyncOutput {
                dry_run: true,
                requested: 0,
                maps,
            });
        }

        output.section("Maps That Would Be Requested (Dry Run)");
        output.table(maps.iter().map(MapRow::from).collect());
        output.info("No requests were enqueued. Run without --dry-run to request them.");
        return Ok(());
    }

    let requested = orchestrator.sync(&request).await?;
    tracing::info!(requested, "Sync finished");
    if output.is_json() {
        return output.result(SyncOutput {
            dry_run: false,
            requested,
            maps: Vec::new(),
        });
    }

    output.success(format!(
        "Requested {} new {} map(s) for {}",
        requested,
        request.map_type.short_name().to_lowercase(),
        request.bounds
    ));
    Ok(())
}
