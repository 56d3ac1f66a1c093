//! The converter contract: one raw record plus its import context in, one
//! [`ConversionResult`] or one classified [`ConverterFailure`] out.

pub mod context;
pub mod converters;
pub mod failure;
pub mod logger;
pub mod registry;
pub mod resolver;

pub use context::{EmptyContext, ImportContext};
pub use failure::{ConverterFailure, FailureDetail, FailureKind};
pub use logger::ImportLogger;
pub use registry::{ConverterKey, ConverterRegistry, ConverterRegistryBuilder, RegistryError};
pub use resolver::ReferenceResolver;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Instant;

use score_core::{ConversionResult, ImportType};

use crate::observability::metrics;

/// A source-specific converter.
///
/// Implementations are stateless apart from read-only collaborators, may be
/// called concurrently, and only ever fail with a [`ConverterFailure`].
/// Failures from the resolver and normalizers are passed through untouched.
#[async_trait]
pub trait ScoreConverter: Send + Sync {
    /// The record shape this source produces
    type Record: DeserializeOwned + Send + Sync;
    /// Source-specific import context data
    type Context: DeserializeOwned + Send + Sync;

    fn name(&self) -> &str;

    async fn convert(
        &self,
        data: &Self::Record,
        context: &ImportContext<Self::Context>,
        import_type: ImportType,
        logger: &ImportLogger,
    ) -> Result<ConversionResult, ConverterFailure>;
}

/// Object-safe converter over raw JSON, as stored in the registry.
#[async_trait]
pub trait RecordConverter: Send + Sync {
    fn name(&self) -> &str;

    async fn convert_raw(
        &self,
        data: &Value,
        context: &ImportContext,
        import_type: ImportType,
        logger: &ImportLogger,
    ) -> Result<ConversionResult, ConverterFailure>;
}

/// Wraps a [`ScoreConverter`] for the registry: decodes the raw record and
/// context, attaches diagnostics to failures, logs and counts them. Successes
/// are counted by the registry once the result matches its key.
pub struct MetricsConverter<C: ScoreConverter> {
    inner: C,
}

impl<C: ScoreConverter> MetricsConverter<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    async fn convert_typed(
        &self,
        data: &Value,
        context: &ImportContext,
        import_type: ImportType,
        logger: &ImportLogger,
    ) -> Result<ConversionResult, ConverterFailure> {
        let record: C::Record = serde_json::from_value(data.clone()).map_err(|e| {
            ConverterFailure::invalid(format!("Malformed {} record: {}", import_type, e))
        })?;

        // The orchestrator builds contexts, so a bad one is our bug, not the user's
        let typed_context = context.typed::<C::Context>().map_err(|e| {
            ConverterFailure::internal(format!(
                "Import context for {} could not be read by {}: {}",
                import_type,
                self.inner.name(),
                e
            ))
        })?;

        self.inner
            .convert(&record, &typed_context, import_type, logger)
            .await
    }
}

#[async_trait]
impl<C: ScoreConverter> RecordConverter for MetricsConverter<C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn convert_raw(
        &self,
        data: &Value,
        context: &ImportContext,
        import_type: ImportType,
        logger: &ImportLogger,
    ) -> Result<ConversionResult, ConverterFailure> {
        let start_time = Instant::now();

        let outcome = self
            .convert_typed(data, context, import_type, logger)
            .await
            .map_err(|failure| {
                let context_json = serde_json::to_value(context).unwrap_or(Value::Null);
                let failure = failure.with_diagnostics(import_type, data, &context_json);
                metrics::convert::conversion_failed(import_type.as_str(), failure.kind().as_str());
                failure.log(logger);
                failure
            });

        metrics::convert::duration(start_time.elapsed().as_secs_f64());
        outcome
    }
}
