use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use score_core::{
    ChartLookup, ConversionResult, Difficulty, DifficultySelector, DryScore, Game, HitMeta,
    IidxDifficulty, IidxLamp, ImportType, Judgements, Lamp, Playtype, ScoreData, ScoreMeta,
};

use super::base::ConverterUtils;
use crate::pipeline::processing::convert::{
    ConverterFailure, ImportContext, ImportLogger, ReferenceResolver, ScoreConverter,
};
use crate::pipeline::processing::normalize::iidx::{convert_csv_lamp, parse_csv_count};
use crate::pipeline::processing::normalize::{grade_and_percent, parse_date_from_string, SourceTimezone};

/// One difficulty's cells from an IIDX score CSV row. Cells are kept as the
/// export wrote them and validated during conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IidxCsvScore {
    pub title: String,
    pub difficulty: IidxDifficulty,
    pub level: String,
    pub ex_score: String,
    pub pgreat: String,
    pub great: String,
    pub miss_count: String,
    pub lamp: String,
    pub dj_level: String,
    pub timestamp: String,
}

/// Context the CSV parser derives from the file and the upload form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IidxCsvContext {
    pub playtype: Playtype,
    pub version: String,
    pub has_beginner_and_legg: bool,
}

/// Converter for e-amusement and PLI IIDX score CSVs
pub struct EamusementIidxConverter {
    resolver: ReferenceResolver,
}

impl EamusementIidxConverter {
    pub fn new(resolver: ReferenceResolver) -> Self {
        Self { resolver }
    }

    fn check_difficulty(
        data: &IidxCsvScore,
        context: &IidxCsvContext,
    ) -> Result<(), ConverterFailure> {
        let needs_hv_layout = matches!(
            data.difficulty,
            IidxDifficulty::Beginner | IidxDifficulty::Leggendaria
        );
        if needs_hv_layout && !context.has_beginner_and_legg {
            return Err(ConverterFailure::invalid(format!(
                "Invalid difficulty of {} - this CSV has no {} columns.",
                data.difficulty.as_str(),
                data.difficulty.as_str()
            )));
        }
        Ok(())
    }

    fn judgements(data: &IidxCsvScore) -> Result<(u32, Judgements), ConverterFailure> {
        let ex_score = parse_csv_count("EX score", &data.ex_score)?
            .ok_or_else(|| ConverterFailure::invalid("Invalid EX score of '---' - expected a number."))?;
        let pgreat = parse_csv_count("pgreat", &data.pgreat)?;
        let great = parse_csv_count("great", &data.great)?;

        if let (Some(pgreat), Some(great)) = (pgreat, great) {
            let expected = u64::from(pgreat) * 2 + u64::from(great);
            if expected != u64::from(ex_score) {
                return Err(ConverterFailure::invalid(format!(
                    "Invalid EX score of {} - {} PGreats and {} Greats make {}.",
                    ex_score, pgreat, great, expected
                )));
            }
        }

        let mut judgements = Judgements::new();
        judgements.insert("pgreat".to_string(), pgreat);
        judgements.insert("great".to_string(), great);
        Ok((ex_score, judgements))
    }
}

#[async_trait]
impl ScoreConverter for EamusementIidxConverter {
    type Record = IidxCsvScore;
    type Context = IidxCsvContext;

    fn name(&self) -> &str {
        "IIDX CSV Converter"
    }

    async fn convert(
        &self,
        data: &IidxCsvScore,
        context: &ImportContext<IidxCsvContext>,
        import_type: ImportType,
        logger: &ImportLogger,
    ) -> Result<ConversionResult, ConverterFailure> {
        let csv = &context.data;
        if !Game::Iidx.supports(csv.playtype) {
            return Err(ConverterFailure::internal(format!(
                "IIDX CSV import was started with playtype {}.",
                csv.playtype
            )));
        }

        Self::check_difficulty(data, csv)?;

        let lamp = convert_csv_lamp(data.lamp.trim())?;
        if lamp == IidxLamp::NoPlay {
            return Err(ConverterFailure::invalid(
                "Invalid lamp of 'NO PLAY' - unplayed charts are not scores.",
            ));
        }

        let (ex_score, judgements) = Self::judgements(data)?;
        let bp = parse_csv_count("miss count", &data.miss_count)?;

        let song = self
            .resolver
            .resolve_song_by_title(Game::Iidx, &data.title)
            .await?
            .ok_or_else(|| {
                ConverterFailure::not_found(format!(
                    "Could not find song with title {}.",
                    data.title
                ))
            })?;

        let chart = self
            .resolver
            .resolve_chart(
                Game::Iidx,
                csv.playtype,
                ChartLookup::SongId(song.id),
                DifficultySelector::Exact(Difficulty::Iidx(data.difficulty)),
                Some(csv.version.as_str()),
            )
            .await?
            .ok_or_else(|| {
                ConverterFailure::not_found(format!(
                    "Could not find chart for {} ({} {} - Version {}).",
                    song.title,
                    csv.playtype,
                    data.difficulty.as_str(),
                    csv.version
                ))
            })?;

        let (grade, percent) = grade_and_percent(Game::Iidx, ex_score, &chart)?;
        let time_achieved = parse_date_from_string(Some(&data.timestamp), SourceTimezone::Jst)?;

        let dry_score = DryScore {
            game: Game::Iidx,
            playtype: csv.playtype,
            import_type,
            service: context.service.clone(),
            time_achieved,
            comment: None,
            score_data: ScoreData {
                grade,
                percent,
                score: ex_score,
                lamp: Lamp::Iidx(lamp),
                judgements,
                hit_meta: HitMeta {
                    bp,
                    ..HitMeta::default()
                },
            },
            score_meta: ScoreMeta::new(),
        };

        ConverterUtils::finish(song, chart, dry_score, logger)
    }
}
