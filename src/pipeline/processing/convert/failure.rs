use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use score_core::{CatalogError, ConsistencyError, ImportType};

use super::logger::ImportLogger;

/// The three ways a conversion can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The record is unusable; skip it and report it
    InvalidScore,
    /// A catalog lookup found nothing; the record may resolve later
    DataNotFound,
    /// A system invariant broke; operators need to look at it
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidScore => "invalid_score",
            FailureKind::DataNotFound => "data_not_found",
            FailureKind::Internal => "internal",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message plus whatever diagnostics were known where the failure was raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureDetail {
    pub message: String,
    pub import_type: Option<ImportType>,
    pub data: Option<Value>,
    pub context: Option<Value>,
}

impl FailureDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            import_type: None,
            data: None,
            context: None,
        }
    }
}

/// Every failure a converter may return. Nothing else crosses the converter
/// boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConverterFailure {
    #[error("Invalid score: {}", .0.message)]
    InvalidScore(FailureDetail),

    #[error("Data not found: {}", .0.message)]
    DataNotFound(FailureDetail),

    #[error("Internal failure: {}", .0.message)]
    Internal(FailureDetail),
}

impl ConverterFailure {
    pub fn invalid(message: impl Into<String>) -> Self {
        ConverterFailure::InvalidScore(FailureDetail::new(message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ConverterFailure::DataNotFound(FailureDetail::new(message))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ConverterFailure::Internal(FailureDetail::new(message))
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ConverterFailure::InvalidScore(_) => FailureKind::InvalidScore,
            ConverterFailure::DataNotFound(_) => FailureKind::DataNotFound,
            ConverterFailure::Internal(_) => FailureKind::Internal,
        }
    }

    pub fn detail(&self) -> &FailureDetail {
        match self {
            ConverterFailure::InvalidScore(d)
            | ConverterFailure::DataNotFound(d)
            | ConverterFailure::Internal(d) => d,
        }
    }

    fn detail_mut(&mut self) -> &mut FailureDetail {
        match self {
            ConverterFailure::InvalidScore(d)
            | ConverterFailure::DataNotFound(d)
            | ConverterFailure::Internal(d) => d,
        }
    }

    pub fn message(&self) -> &str {
        &self.detail().message
    }

    /// Attach the import type, raw record and context, keeping anything the
    /// raising site already set.
    pub fn with_diagnostics(mut self, import_type: ImportType, data: &Value, context: &Value) -> Self {
        let detail = self.detail_mut();
        detail.import_type.get_or_insert(import_type);
        if detail.data.is_none() {
            detail.data = Some(data.clone());
        }
        if detail.context.is_none() {
            detail.context = Some(context.clone());
        }
        self
    }

    /// Log at the severity this kind calls for
    pub fn log(&self, logger: &ImportLogger) {
        match self.kind() {
            FailureKind::InvalidScore => logger.warn(&self.to_string()),
            FailureKind::DataNotFound => logger.info(&self.to_string()),
            FailureKind::Internal => logger.severe(&self.to_string()),
        }
    }
}

impl From<CatalogError> for ConverterFailure {
    fn from(err: CatalogError) -> Self {
        ConverterFailure::internal(format!("Reference catalog lookup failed: {}", err))
    }
}

impl From<ConsistencyError> for ConverterFailure {
    fn from(err: ConsistencyError) -> Self {
        ConverterFailure::internal(format!("Inconsistent conversion result: {}", err))
    }
}
