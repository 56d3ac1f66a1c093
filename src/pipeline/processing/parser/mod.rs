//! Turn uploaded files into raw records plus the import context they share.

pub mod batch_manual;
pub mod eamusement_iidx_csv;

pub use batch_manual::{parse_batch_manual, BatchManualParser};
pub use eamusement_iidx_csv::{parse_eamusement_iidx_csv, EamusementIidxCsvParser};

use serde_json::Value;
use thiserror::Error;

use score_core::{Game, Playtype};

use crate::observability::metrics;
use crate::pipeline::processing::convert::ImportContext;

/// Records extracted from one file, ready for the converter registry
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedImport {
    pub records: Vec<Value>,
    pub context: ImportContext,
}

/// A file that cannot be read at all. Problems with single scores are left to
/// the converters.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("File is not valid UTF-8")]
    NotUtf8(#[from] std::str::Utf8Error),

    #[error("File has no header row")]
    MissingHeader,

    #[error("Unrecognised CSV header with {columns} columns")]
    UnknownLayout { columns: usize },

    #[error("Row {line} has {found} cells, expected {expected}")]
    RowLength {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Unknown game version '{0}'")]
    UnknownVersion(String),

    #[error("Version {version} does not match the CSV's column layout")]
    VersionLayoutMismatch { version: String },

    #[error("{game} has no playtype {playtype}")]
    UnsupportedPlaytype { game: Game, playtype: Playtype },

    #[error("Invalid meta block: {0}")]
    InvalidMeta(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait Parser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedImport, ParseError>;
}

/// A wrapper that adds metrics to any parser implementation
pub struct MetricsParser<P: Parser> {
    inner: P,
}

impl<P: Parser> MetricsParser<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

impl<P: Parser> Parser for MetricsParser<P> {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedImport, ParseError> {
        let start_time = std::time::Instant::now();

        match self.inner.parse(bytes) {
            Ok(parsed) => {
                metrics::parser::parse_success();
                metrics::parser::records_extracted(parsed.records.len() as u64);
                metrics::parser::duration(start_time.elapsed().as_secs_f64());
                Ok(parsed)
            }
            Err(e) => {
                metrics::parser::parse_error();
                metrics::parser::duration(start_time.elapsed().as_secs_f64());
                Err(e)
            }
        }
    }
}
