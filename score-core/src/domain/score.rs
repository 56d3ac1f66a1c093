use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::chart::{ChartIdentity, SongIdentity};
use super::game::{Game, Grade, Lamp, Playtype};
use crate::common::error::{ConsistencyError, DomainError};

/// Tag naming the source and format a raw record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ImportType {
    #[serde(rename = "api/cg-dev-sdvx")]
    ApiCgDevSdvx,
    #[serde(rename = "api/cg-nag-sdvx")]
    ApiCgNagSdvx,
    #[serde(rename = "api/cg-gan-sdvx")]
    ApiCgGanSdvx,
    #[serde(rename = "file/eamusement-iidx-csv")]
    FileEamusementIidxCsv,
    #[serde(rename = "file/pli-iidx-csv")]
    FilePliIidxCsv,
    #[serde(rename = "file/batch-manual")]
    FileBatchManual,
}

impl ImportType {
    pub const ALL: [ImportType; 6] = [
        ImportType::ApiCgDevSdvx,
        ImportType::ApiCgNagSdvx,
        ImportType::ApiCgGanSdvx,
        ImportType::FileEamusementIidxCsv,
        ImportType::FilePliIidxCsv,
        ImportType::FileBatchManual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportType::ApiCgDevSdvx => "api/cg-dev-sdvx",
            ImportType::ApiCgNagSdvx => "api/cg-nag-sdvx",
            ImportType::ApiCgGanSdvx => "api/cg-gan-sdvx",
            ImportType::FileEamusementIidxCsv => "file/eamusement-iidx-csv",
            ImportType::FilePliIidxCsv => "file/pli-iidx-csv",
            ImportType::FileBatchManual => "file/batch-manual",
        }
    }

    pub fn is_file_upload(&self) -> bool {
        self.as_str().starts_with("file/")
    }
}

impl fmt::Display for ImportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImportType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::unknown("import type", s))
    }
}

/// A value in the open score metadata bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for MetaValue {
    fn from(v: bool) -> Self {
        MetaValue::Bool(v)
    }
}

impl From<f64> for MetaValue {
    fn from(v: f64) -> Self {
        MetaValue::Number(v)
    }
}

impl From<u32> for MetaValue {
    fn from(v: u32) -> Self {
        MetaValue::Number(f64::from(v))
    }
}

impl From<String> for MetaValue {
    fn from(v: String) -> Self {
        MetaValue::Text(v)
    }
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        MetaValue::Text(v.to_string())
    }
}

pub type ScoreMeta = BTreeMap<String, MetaValue>;

/// Judgement counts keyed by the game's judgement names.
pub type Judgements = BTreeMap<String, Option<u32>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HitMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_combo: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bp: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slow: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gauge: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreData {
    pub grade: Grade,
    /// 0 to 100, always derived from the score and chart
    pub percent: f64,
    pub score: u32,
    pub lamp: Lamp,
    pub judgements: Judgements,
    pub hit_meta: HitMeta,
}

/// A fully normalized score that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryScore {
    pub game: Game,
    pub playtype: Playtype,
    pub import_type: ImportType,
    pub service: String,
    pub time_achieved: Option<DateTime<Utc>>,
    pub comment: Option<String>,
    pub score_data: ScoreData,
    pub score_meta: ScoreMeta,
}

/// The song, chart and dry score produced by one successful conversion.
///
/// Only constructible through [`ConversionResult::new`], which checks that the
/// three parts describe the same play.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    song: SongIdentity,
    chart: ChartIdentity,
    dry_score: DryScore,
}

impl ConversionResult {
    pub fn new(
        song: SongIdentity,
        chart: ChartIdentity,
        dry_score: DryScore,
    ) -> Result<Self, ConsistencyError> {
        if chart.song_id != song.id {
            return Err(ConsistencyError::SongMismatch {
                chart_id: chart.chart_id.clone(),
                chart_song_id: chart.song_id,
                song_id: song.id,
            });
        }

        if chart.game != song.game {
            return Err(ConsistencyError::SongGameMismatch {
                chart_id: chart.chart_id.clone(),
                chart_game: chart.game.to_string(),
                song_game: song.game.to_string(),
            });
        }

        if dry_score.game != chart.game || dry_score.playtype != chart.playtype {
            return Err(ConsistencyError::ScoreChartMismatch {
                chart_id: chart.chart_id.clone(),
                score: format!("{}:{}", dry_score.game, dry_score.playtype),
                chart: format!("{}:{}", chart.game, chart.playtype),
            });
        }

        let lamp = dry_score.score_data.lamp;
        if lamp.game() != chart.game {
            return Err(ConsistencyError::ForeignValue {
                field: "lamp",
                value: lamp.to_string(),
                game: chart.game.to_string(),
            });
        }

        let grade = dry_score.score_data.grade;
        if grade.game() != chart.game {
            return Err(ConsistencyError::ForeignValue {
                field: "grade",
                value: grade.to_string(),
                game: chart.game.to_string(),
            });
        }

        Ok(Self {
            song,
            chart,
            dry_score,
        })
    }

    pub fn song(&self) -> &SongIdentity {
        &self.song
    }

    pub fn chart(&self) -> &ChartIdentity {
        &self.chart
    }

    pub fn dry_score(&self) -> &DryScore {
        &self.dry_score
    }

    pub fn into_parts(self) -> (SongIdentity, ChartIdentity, DryScore) {
        (self.song, self.chart, self.dry_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::ChartData;
    use crate::domain::game::{Difficulty, SdvxDifficulty, SdvxGrade, SdvxLamp};

    fn song() -> SongIdentity {
        SongIdentity {
            id: 7,
            game: Game::Sdvx,
            title: "Lachryma".to_string(),
            artist: "Kanekochiharu".to_string(),
            alt_titles: Vec::new(),
        }
    }

    fn chart(song_id: u32) -> ChartIdentity {
        ChartIdentity {
            chart_id: "sdvx-7-exh".to_string(),
            song_id,
            game: Game::Sdvx,
            playtype: Playtype::Single,
            difficulty: Difficulty::Sdvx(SdvxDifficulty::Exh),
            versions: vec!["exceed".to_string()],
            data: ChartData::Sdvx { in_game_id: 7 },
        }
    }

    fn dry_score() -> DryScore {
        DryScore {
            game: Game::Sdvx,
            playtype: Playtype::Single,
            import_type: ImportType::ApiCgDevSdvx,
            service: "CG Dev".to_string(),
            time_achieved: None,
            comment: None,
            score_data: ScoreData {
                grade: Grade::Sdvx(SdvxGrade::S),
                percent: 99.1,
                score: 9_910_000,
                lamp: Lamp::Sdvx(SdvxLamp::ExcessiveClear),
                judgements: Judgements::new(),
                hit_meta: HitMeta::default(),
            },
            score_meta: ScoreMeta::new(),
        }
    }

    #[test]
    fn test_consistent_parts_build() {
        let result = ConversionResult::new(song(), chart(7), dry_score()).unwrap();
        assert_eq!(result.chart().song_id, result.song().id);
        assert_eq!(result.dry_score().game, result.chart().game);
    }

    #[test]
    fn test_chart_from_other_song_is_rejected() {
        let err = ConversionResult::new(song(), chart(8), dry_score()).unwrap_err();
        assert!(matches!(err, ConsistencyError::SongMismatch { .. }));
    }

    #[test]
    fn test_score_for_other_playtype_is_rejected() {
        let mut score = dry_score();
        score.playtype = Playtype::Sp;
        let err = ConversionResult::new(song(), chart(7), score).unwrap_err();
        assert!(matches!(err, ConsistencyError::ScoreChartMismatch { .. }));
    }

    #[test]
    fn test_meta_value_is_a_closed_union() {
        let ok: ScoreMeta =
            serde_json::from_str(r#"{"random": "MIRROR", "gauge": 80.5, "assist": false}"#)
                .unwrap();
        assert_eq!(ok.get("random"), Some(&MetaValue::Text("MIRROR".to_string())));

        let nested: Result<ScoreMeta, _> = serde_json::from_str(r#"{"nested": {"a": 1}}"#);
        assert!(nested.is_err());
    }

    #[test]
    fn test_import_type_round_trips_through_str() {
        for import_type in ImportType::ALL {
            assert_eq!(import_type.as_str().parse::<ImportType>().unwrap(), import_type);
        }
    }
}
