//! Metrics for the score import pipeline
//!
//! Recording is always on; nothing is exported unless a recorder has been
//! installed with [`init`]. Without one the `metrics` macros are no-ops.

use std::fmt;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Parser metrics
    ParserParseSuccess,
    ParserParseError,
    ParserDuration,
    ParserRecordsExtracted,

    // Convert metrics
    ConvertConversions,
    ConvertFailures,
    ConvertDuration,
    ConvertBatchesProcessed,
    ConvertBatchSize,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::ParserParseSuccess => "score_import_parser_parse_success_total",
            MetricName::ParserParseError => "score_import_parser_parse_error_total",
            MetricName::ParserDuration => "score_import_parser_duration_seconds",
            MetricName::ParserRecordsExtracted => "score_import_parser_records_extracted_total",

            MetricName::ConvertConversions => "score_import_conversions_total",
            MetricName::ConvertFailures => "score_import_failures_total",
            MetricName::ConvertDuration => "score_import_conversion_duration_seconds",
            MetricName::ConvertBatchesProcessed => "score_import_batches_processed_total",
            MetricName::ConvertBatchSize => "score_import_batch_size",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        [
            MetricName::ParserParseSuccess,
            MetricName::ParserParseError,
            MetricName::ParserDuration,
            MetricName::ParserRecordsExtracted,
            MetricName::ConvertConversions,
            MetricName::ConvertFailures,
            MetricName::ConvertDuration,
            MetricName::ConvertBatchesProcessed,
            MetricName::ConvertBatchSize,
        ]
        .into_iter()
    }

    /// (phase, description, unit)
    pub fn metadata(&self) -> (&'static str, &'static str, Option<&'static str>) {
        match self {
            MetricName::ParserParseSuccess => ("parser", "Files parsed", None),
            MetricName::ParserParseError => ("parser", "Files rejected by a parser", None),
            MetricName::ParserDuration => ("parser", "Parse duration", Some("s")),
            MetricName::ParserRecordsExtracted => ("parser", "Records extracted", None),

            MetricName::ConvertConversions => ("convert", "Records converted, by import type", None),
            MetricName::ConvertFailures => ("convert", "Conversion failures, by import type and kind", None),
            MetricName::ConvertDuration => ("convert", "Time to convert one record", Some("s")),
            MetricName::ConvertBatchesProcessed => ("convert", "Batches converted", None),
            MetricName::ConvertBatchSize => ("convert", "Records per batch", None),
        }
    }
}

/// Install the Prometheus recorder. The handle renders the current snapshot.
pub fn init() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;

    for metric in MetricName::all_metrics() {
        let (_, description, _) = metric.metadata();
        match metric {
            MetricName::ParserDuration | MetricName::ConvertDuration | MetricName::ConvertBatchSize => {
                ::metrics::describe_histogram!(metric.as_str(), description)
            }
            _ => ::metrics::describe_counter!(metric.as_str(), description),
        }
    }

    info!("Metrics system initialized");
    Ok(handle)
}

// ============================================================================
// Parser Metrics
// ============================================================================

pub mod parser {
    use super::MetricName;

    pub fn parse_success() {
        ::metrics::counter!(MetricName::ParserParseSuccess.as_str()).increment(1);
    }

    pub fn parse_error() {
        ::metrics::counter!(MetricName::ParserParseError.as_str()).increment(1);
    }

    pub fn duration(secs: f64) {
        ::metrics::histogram!(MetricName::ParserDuration.as_str()).record(secs);
    }

    pub fn records_extracted(count: u64) {
        ::metrics::counter!(MetricName::ParserRecordsExtracted.as_str()).increment(count);
    }
}

// ============================================================================
// Convert Metrics
// ============================================================================

pub mod convert {
    use super::MetricName;

    /// Record a successful conversion
    pub fn conversion_succeeded(import_type: &str) {
        ::metrics::counter!(
            MetricName::ConvertConversions.as_str(),
            "import_type" => import_type.to_string()
        )
        .increment(1);
    }

    /// Record a failed conversion with its failure kind
    pub fn conversion_failed(import_type: &str, kind: &str) {
        ::metrics::counter!(
            MetricName::ConvertFailures.as_str(),
            "import_type" => import_type.to_string(),
            "kind" => kind.to_string()
        )
        .increment(1);
    }

    pub fn duration(secs: f64) {
        ::metrics::histogram!(MetricName::ConvertDuration.as_str()).record(secs);
    }

    pub fn batch_processed(batch_size: usize) {
        ::metrics::histogram!(MetricName::ConvertBatchSize.as_str()).record(batch_size as f64);
        ::metrics::counter!(MetricName::ConvertBatchesProcessed.as_str()).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_metric_names_are_unique_and_prefixed() {
        let names: HashSet<&str> = MetricName::all_metrics().map(|m| m.as_str()).collect();
        assert_eq!(names.len(), MetricName::all_metrics().count());
        assert!(names.iter().all(|n| n.starts_with("score_import_")));
    }

    #[test]
    fn test_recording_without_recorder_is_a_no_op() {
        convert::conversion_succeeded("file/batch-manual");
        convert::conversion_failed("file/batch-manual", "invalid_score");
        convert::batch_processed(3);
        parser::records_extracted(3);
    }
}
