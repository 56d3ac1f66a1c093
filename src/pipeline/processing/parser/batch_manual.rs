use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use score_core::{Game, Playtype};

use super::{ParseError, ParsedImport, Parser};
use crate::pipeline::processing::convert::converters::BatchManualContext;
use crate::pipeline::processing::convert::ImportContext;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BatchManualMeta {
    game: Game,
    playtype: Playtype,
    service: String,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BatchManualFile {
    meta: BatchManualMeta,
    scores: Vec<Value>,
}

/// Parse a batch-manual upload: `{"meta": {...}, "scores": [...]}`.
///
/// Only the meta block is validated here. Scores are passed on untouched so
/// each bad score is reported on its own.
pub fn parse_batch_manual(bytes: &[u8]) -> Result<ParsedImport, ParseError> {
    let file: BatchManualFile = serde_json::from_slice(bytes)?;
    let meta = file.meta;

    if !meta.game.supports(meta.playtype) {
        return Err(ParseError::UnsupportedPlaytype {
            game: meta.game,
            playtype: meta.playtype,
        });
    }

    let service = meta.service.trim();
    if service.is_empty() {
        return Err(ParseError::InvalidMeta("service must not be blank".to_string()));
    }

    info!(
        "Batch manual: {} scores for {} {} from {}",
        file.scores.len(),
        meta.game,
        meta.playtype,
        service
    );

    let context = ImportContext {
        service: service.to_string(),
        user_id: None,
        data: serde_json::to_value(BatchManualContext {
            game: meta.game,
            playtype: meta.playtype,
            version: meta.version,
        })?,
    };

    Ok(ParsedImport {
        records: file.scores,
        context,
    })
}

pub struct BatchManualParser;

impl Parser for BatchManualParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedImport, ParseError> {
        parse_batch_manual(bytes)
    }
}
