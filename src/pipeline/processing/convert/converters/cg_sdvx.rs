use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use score_core::{
    ChartLookup, ConversionResult, DryScore, Game, HitMeta, ImportType, Judgements, Lamp, Playtype,
    ScoreData, ScoreMeta,
};

use super::base::ConverterUtils;
use crate::pipeline::processing::convert::{
    ConverterFailure, EmptyContext, ImportContext, ImportLogger, ReferenceResolver, ScoreConverter,
};
use crate::pipeline::processing::normalize::sdvx::{
    convert_cg_difficulty, convert_cg_lamp, convert_cg_version,
};
use crate::pipeline::processing::normalize::{grade_and_percent, parse_date_from_string, SourceTimezone};

/// One SDVX score as sent by a CG-family network API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CgSdvxScore {
    pub internal_id: u32,
    pub difficulty: i64,
    pub version: i64,
    pub clear_type: i64,
    pub score: u32,
    pub critical: u32,
    pub near: u32,
    pub error: u32,
    pub max_chain: u32,
    #[serde(default)]
    pub date_time: Option<String>,
}

/// Converter for SDVX scores from the CG Dev, NAG and GAN APIs
pub struct CgSdvxConverter {
    resolver: ReferenceResolver,
}

impl CgSdvxConverter {
    pub fn new(resolver: ReferenceResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl ScoreConverter for CgSdvxConverter {
    type Record = CgSdvxScore;
    type Context = EmptyContext;

    fn name(&self) -> &str {
        "CG SDVX Converter"
    }

    async fn convert(
        &self,
        data: &CgSdvxScore,
        context: &ImportContext<EmptyContext>,
        import_type: ImportType,
        logger: &ImportLogger,
    ) -> Result<ConversionResult, ConverterFailure> {
        let difficulty = convert_cg_difficulty(data.difficulty)?;
        let version = convert_cg_version(data.version)?;

        let chart = self
            .resolver
            .resolve_chart(
                Game::Sdvx,
                Playtype::Single,
                ChartLookup::InGameId(data.internal_id),
                difficulty,
                Some(version.as_str()),
            )
            .await?
            .ok_or_else(|| {
                ConverterFailure::not_found(format!(
                    "Could not find chart with songID {} ({} - Version {})",
                    data.internal_id, difficulty, version
                ))
            })?;

        let song = ConverterUtils::song_for_chart(&self.resolver, &chart).await?;

        let lamp = convert_cg_lamp(version, data.clear_type)?;
        let (grade, percent) = grade_and_percent(Game::Sdvx, data.score, &chart)?;
        let time_achieved = parse_date_from_string(data.date_time.as_deref(), SourceTimezone::Utc)?;

        let judgements: Judgements = [
            ("critical", data.critical),
            ("near", data.near),
            ("miss", data.error),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), Some(v)))
        .collect();

        let dry_score = DryScore {
            game: Game::Sdvx,
            playtype: Playtype::Single,
            import_type,
            service: context.service.clone(),
            time_achieved,
            comment: None,
            score_data: ScoreData {
                grade,
                percent,
                score: data.score,
                lamp: Lamp::Sdvx(lamp),
                judgements,
                hit_meta: HitMeta {
                    max_combo: Some(data.max_chain),
                    ..HitMeta::default()
                },
            },
            score_meta: ScoreMeta::new(),
        };

        ConverterUtils::finish(song, chart, dry_score, logger)
    }
}
