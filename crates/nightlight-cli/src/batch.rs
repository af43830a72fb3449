use nightlight_sync::BatchReport;

use crate::output::OutputWriter;
use crate::output_types::{FailureOutput, PublishManyOutput, PublishOutput};

/// Summary of a bulk publish, ready for display
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: Vec<(String, String)>,
    pub failed: Vec<(String, String)>,
}

impl BatchSummary {
    pub fn success_count(&self) -> usize {
        self.successful.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Display summary to output
    pub fn display(&self, output: &OutputWriter) {
        output.section("Publish Summary");
        output.kv("Total Maps", self.total);
        output.kv("Published", self.success_count());
        output.kv("Failed", self.failure_count());

        if !self.successful.is_empty() {
            output.section("Published");
            for (key, url) in &self.successful {
                output.success(format!("{} - {}", key, url));
            }
        }

        if !self.failed.is_empty() {
            output.section("Failed Maps");
            for (i, (key, error)) in self.failed.iter().enumerate() {
                output.error(format!("{}. {} - {}", i + 1, key, error));
            }
        }
    }
}

impl From<&BatchReport> for BatchSummary {
    fn from(report: &BatchReport) -> Self {
        Self {
            total: report.total(),
            successful: report
                .succeeded
                .iter()
                .map(|entry| (entry.canonical_key(), entry.url.clone()))
                .collect(),
            failed: report
                .failed
                .iter()
                .map(|failure| (failure.map.canonical_key(), failure.error.to_string()))
                .collect(),
        }
    }
}

impl From<BatchReport> for PublishManyOutput {
    fn from(report: BatchReport) -> Self {
        Self {
            total: report.total(),
            published: report
                .succeeded
                .into_iter()
                .map(|entry| PublishOutput {
                    key: entry.canonical_key(),
                    url: entry.url,
                    map: entry.identity,
                })
                .collect(),
            failed: report
                .failed
                .into_iter()
                .map(|failure| FailureOutput {
                    key: failure.map.canonical_key(),
                    error: failure.error.to_string(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nightlight_core::models::{Bounds, Date, MapIdentity, MapProvider, MapType, PublishedEntry};
    use nightlight_core::NightlightError;
    use nightlight_sync::BatchFailure;

    fn map(month: u32) -> MapIdentity {
        MapIdentity::new(
            MapProvider::Eogdata,
            Bounds::UkraineAndAround,
            MapType::Monthly,
            Date::new(2021, month, 1),
        )
    }

    fn report() -> BatchReport {
        BatchReport {
            succeeded: vec![PublishedEntry::new(map(1), "tiles://nightlight.Monthly-UkraineAnd_2021-1-1")],
            failed: vec![BatchFailure {
                map: map(2),
                error: NightlightError::NilAsset {
                    key: "Monthly-UkraineAnd_2021-2-1".to_string(),
                },
            }],
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::default();
        assert_eq!(summary.success_count(), 0);
        assert!(summary.all_succeeded());
    }

    #[test]
    fn test_summary_from_report() {
        let summary = BatchSummary::from(&report());

        assert_eq!(summary.total, 2);
        assert_eq!(summary.success_count(), 1);
        assert_eq!(summary.failure_count(), 1);
        assert!(!summary.all_succeeded());
        assert_eq!(summary.failed[0].0, "Monthly-UkraineAnd_2021-2-1");
    }

    #[test]
    fn test_json_output_from_report() {
        let output = PublishManyOutput::from(report());

        assert_eq!(output.total, 2);
        assert_eq!(output.published[0].key, "Monthly-UkraineAnd_2021-1-1");
        assert_eq!(output.failed.len(), 1);
    }
}
