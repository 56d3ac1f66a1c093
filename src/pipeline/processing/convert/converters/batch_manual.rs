use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use score_core::{
    ChartIdentity, ChartLookup, ConversionResult, DifficultySelector, DryScore, Game, HitMeta,
    ImportType, Judgements, Playtype, ScoreData, ScoreMeta, SongIdentity,
};

use super::base::ConverterUtils;
use crate::pipeline::processing::convert::{
    ConverterFailure, ImportContext, ImportLogger, ReferenceResolver, ScoreConverter,
};
use crate::pipeline::processing::normalize::{
    grade_and_percent, parse_difficulty, parse_lamp, parse_unix_millis, validate_judgements,
};

/// How a batch-manual score names its chart's song
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    #[serde(rename = "songTitle")]
    SongTitle,
    #[serde(rename = "tachiSongID")]
    TachiSongId,
    #[serde(rename = "inGameID")]
    InGameId,
}

/// One score from a batch-manual JSON upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BatchManualScore {
    pub score: u32,
    pub lamp: String,
    pub match_type: MatchType,
    pub identifier: String,
    pub difficulty: String,
    #[serde(default)]
    pub time_achieved: Option<i64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub judgements: Judgements,
    #[serde(default)]
    pub hit_meta: HitMeta,
    #[serde(default)]
    pub score_meta: ScoreMeta,
}

/// Taken from the upload's `meta` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchManualContext {
    pub game: Game,
    pub playtype: Playtype,
    #[serde(default)]
    pub version: Option<String>,
}

/// Converter for client-built batch-manual JSON
pub struct BatchManualConverter {
    resolver: ReferenceResolver,
}

impl BatchManualConverter {
    pub fn new(resolver: ReferenceResolver) -> Self {
        Self { resolver }
    }

    fn numeric_identifier(data: &BatchManualScore) -> Result<u32, ConverterFailure> {
        data.identifier.trim().parse::<u32>().map_err(|_| {
            ConverterFailure::invalid(format!(
                "Invalid identifier of '{}' - {:?} matches need a numeric identifier.",
                data.identifier, data.match_type
            ))
        })
    }

    async fn resolve(
        &self,
        data: &BatchManualScore,
        batch: &BatchManualContext,
        difficulty: DifficultySelector,
    ) -> Result<(SongIdentity, ChartIdentity), ConverterFailure> {
        let version = batch.version.as_deref();

        let song = match data.match_type {
            MatchType::InGameId => {
                let id = Self::numeric_identifier(data)?;
                let chart = self
                    .resolver
                    .resolve_chart(batch.game, batch.playtype, ChartLookup::InGameId(id), difficulty, version)
                    .await?
                    .ok_or_else(|| {
                        ConverterFailure::not_found(format!(
                            "Could not find chart with inGameID {} ({} {}).",
                            id, batch.playtype, difficulty
                        ))
                    })?;
                let song = ConverterUtils::song_for_chart(&self.resolver, &chart).await?;
                return Ok((song, chart));
            }
            MatchType::TachiSongId => {
                let id = Self::numeric_identifier(data)?;
                self.resolver
                    .resolve_song(batch.game, id)
                    .await?
                    .ok_or_else(|| {
                        ConverterFailure::not_found(format!("Could not find song with songID {}.", id))
                    })?
            }
            MatchType::SongTitle => self
                .resolver
                .resolve_song_by_title(batch.game, &data.identifier)
                .await?
                .ok_or_else(|| {
                    ConverterFailure::not_found(format!(
                        "Could not find song with title {}.",
                        data.identifier
                    ))
                })?,
        };

        let chart = self
            .resolver
            .resolve_chart(batch.game, batch.playtype, ChartLookup::SongId(song.id), difficulty, version)
            .await?
            .ok_or_else(|| {
                ConverterFailure::not_found(format!(
                    "Could not find chart for {} ({} {}).",
                    song.title, batch.playtype, difficulty
                ))
            })?;

        Ok((song, chart))
    }
}

#[async_trait]
impl ScoreConverter for BatchManualConverter {
    type Record = BatchManualScore;
    type Context = BatchManualContext;

    fn name(&self) -> &str {
        "Batch Manual Converter"
    }

    async fn convert(
        &self,
        data: &BatchManualScore,
        context: &ImportContext<BatchManualContext>,
        import_type: ImportType,
        logger: &ImportLogger,
    ) -> Result<ConversionResult, ConverterFailure> {
        let batch = &context.data;
        if !batch.game.supports(batch.playtype) {
            return Err(ConverterFailure::internal(format!(
                "Batch manual import was started for {} {}, which is not a valid playtype.",
                batch.game, batch.playtype
            )));
        }

        let difficulty = parse_difficulty(batch.game, &data.difficulty)?;
        let lamp = parse_lamp(batch.game, &data.lamp)?;
        validate_judgements(batch.game, &data.judgements)?;

        let (song, chart) = self
            .resolve(data, batch, DifficultySelector::Exact(difficulty))
            .await?;

        let (grade, percent) = grade_and_percent(batch.game, data.score, &chart)?;
        let time_achieved = parse_unix_millis(data.time_achieved)?;

        let dry_score = DryScore {
            game: batch.game,
            playtype: batch.playtype,
            import_type,
            service: context.service.clone(),
            time_achieved,
            comment: ConverterUtils::clean_comment(data.comment.as_deref()),
            score_data: ScoreData {
                grade,
                percent,
                score: data.score,
                lamp,
                judgements: data.judgements.clone(),
                hit_meta: data.hit_meta.clone(),
            },
            score_meta: data.score_meta.clone(),
        };

        ConverterUtils::finish(song, chart, dry_score, logger)
    }
}
