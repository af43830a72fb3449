//! Delete command

use anyhow::Result;
use nightlight_core::models::MapIdentity;
use nightlight_sync::Orchestrator;
use tabled::Tabled;

use super::parse_json_argument;
use crate::cli::MapArgs;
use crate::output::OutputWriter;
use crate::output_types::{DeleteOutput, StepFailureOutput};

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Store")]
    store: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
}

pub async fn execute(args: MapArgs, orchestrator: &Orchestrator, output: &OutputWriter) -> Result<()> {
    let map: MapIdentity = parse_json_argument(&args.map)?;
    let key = map.canonical_key();
    tracing::info!(key = %key, "Deleting map");
    let report = orchestrator.delete_map(&map).await?;
    tracing::info!(
        key = %key,
        completed = report.completed.len(),
        failed = report.failures.len(),
        "Delete finished"
    );

    if output.is_json() {
        return output.result(DeleteOutput {
            key,
            completed: report.completed.iter().map(|s| s.to_string()).collect(),
            failed: report
                .failures
                .iter()
                .map(|f| StepFailureOutput {
                    store: f.step.to_string(),
                    error: f.error.to_string(),
                })
                .collect(),
        });
    }

    output.section(format!("Deleting {}", key));
    let mut rows: Vec<OutcomeRow> = report
        .completed
        .iter()
        .map(|step| OutcomeRow {
            store: step.to_string(),
            outcome: "deleted".to_string(),
        })
        .collect();
    rows.extend(report.failures.iter().map(|f| OutcomeRow {
        store: f.step.to_string(),
        outcome: format!("failed: {}", f.error),
    }));
    output.table(rows);

    if report.is_success() {
        output.success(format!("Deleted {} everywhere", key));
    } else {
        output.warning(format!(
            "{} store(s) could not be cleaned up; see the log for details",
            report.failures.len()
        ));
    }
    Ok(())
}
