use thiserror::Error;

use score_core::{CatalogError, DomainError};

use crate::pipeline::processing::convert::RegistryError;
use crate::pipeline::processing::parser::ParseError;

/// Errors that stop an import as a whole. Failures of single records are
/// `ConverterFailure`s and never end up here.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Could not parse upload: {0}")]
    Parse(#[from] ParseError),

    #[error("Converter registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Reference catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Conversion task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Failed to write conversion output: {0}")]
    Output(String),
}

pub type Result<T> = std::result::Result<T, ImportError>;
