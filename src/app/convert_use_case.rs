use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, info};

use score_core::ConversionResult;

use crate::app::ports::ConvertOutputPort;
use crate::error::{ImportError, Result};
use crate::observability::metrics;
use crate::pipeline::processing::convert::{
    ConverterFailure, ConverterKey, ConverterRegistry, FailureKind, ImportContext,
};

#[derive(Debug, Clone)]
pub struct ConvertedRecord {
    pub index: usize,
    pub result: ConversionResult,
}

#[derive(Debug, Clone)]
pub struct FailedRecord {
    pub index: usize,
    pub failure: ConverterFailure,
}

/// Outcome of one batch, partitioned by failure kind. Every input record
/// appears in exactly one partition, ordered by input index.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub converted: Vec<ConvertedRecord>,
    pub invalid: Vec<FailedRecord>,
    /// Catalog misses. Not retried; the caller may resubmit once the catalog
    /// has caught up.
    pub unresolved: Vec<FailedRecord>,
    pub internal: Vec<FailedRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub converted: usize,
    pub invalid: usize,
    pub unresolved: usize,
    pub internal: usize,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.converted.len() + self.invalid.len() + self.unresolved.len() + self.internal.len()
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            total: self.total(),
            converted: self.converted.len(),
            invalid: self.invalid.len(),
            unresolved: self.unresolved.len(),
            internal: self.internal.len(),
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &FailedRecord> {
        self.invalid
            .iter()
            .chain(self.unresolved.iter())
            .chain(self.internal.iter())
    }

    fn push(&mut self, index: usize, outcome: std::result::Result<ConversionResult, ConverterFailure>) {
        match outcome {
            Ok(result) => self.converted.push(ConvertedRecord { index, result }),
            Err(failure) => {
                let record = FailedRecord { index, failure };
                match record.failure.kind() {
                    FailureKind::InvalidScore => self.invalid.push(record),
                    FailureKind::DataNotFound => self.unresolved.push(record),
                    FailureKind::Internal => self.internal.push(record),
                }
            }
        }
    }
}

/// Use case for converting a batch of raw records from one import
pub struct ConvertUseCase {
    registry: Arc<ConverterRegistry>,
    output: Box<dyn ConvertOutputPort>,
    max_concurrency: usize,
}

impl ConvertUseCase {
    pub fn new(
        registry: Arc<ConverterRegistry>,
        output: Box<dyn ConvertOutputPort>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            registry,
            output,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Convert every record, at most `max_concurrency` at a time, then write
    /// the successes to the output port in input order.
    pub async fn convert_batch(
        &self,
        key: ConverterKey,
        records: Vec<Value>,
        context: ImportContext,
    ) -> Result<BatchReport> {
        let batch_size = records.len();
        let context = Arc::new(context);
        let mut tasks = JoinSet::new();
        let mut outcomes = Vec::with_capacity(batch_size);

        info!("Converting {} records for {}", batch_size, key);

        for (index, record) in records.into_iter().enumerate() {
            if tasks.len() >= self.max_concurrency {
                if let Some(joined) = tasks.join_next().await {
                    outcomes.push(joined?);
                }
            }

            let registry = Arc::clone(&self.registry);
            let context = Arc::clone(&context);
            tasks.spawn(async move {
                let outcome = registry.convert(key, &record, &context).await;
                (index, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            outcomes.push(joined?);
        }

        outcomes.sort_by_key(|(index, _)| *index);

        let mut report = BatchReport::default();
        for (index, outcome) in outcomes {
            report.push(index, outcome);
        }

        for converted in &report.converted {
            self.output
                .write_conversion(converted.index, &converted.result)
                .await
                .map_err(|e| ImportError::Output(e.to_string()))?;
        }

        metrics::convert::batch_processed(batch_size);
        debug!("Batch summary for {}: {:?}", key, report.summary());
        Ok(report)
    }
}
