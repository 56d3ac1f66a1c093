use serde::{Deserialize, Serialize};

use super::game::{Difficulty, Game, Playtype};

/// Canonical reference to a song. One song owns many charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongIdentity {
    pub id: u32,
    pub game: Game,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub alt_titles: Vec<String>,
}

impl SongIdentity {
    /// Case-insensitive match against the title or any alternate title
    pub fn matches_title(&self, title: &str) -> bool {
        let wanted = title.trim().to_lowercase();
        self.title.to_lowercase() == wanted
            || self.alt_titles.iter().any(|t| t.to_lowercase() == wanted)
    }
}

/// Game-specific chart data the normalizers need.
///
/// IIDX is listed first so that an IIDX chart carrying an in-game id is not
/// read as SDVX data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartData {
    #[serde(rename_all = "camelCase")]
    Iidx {
        notecount: u32,
        #[serde(default, rename = "inGameID")]
        in_game_id: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    Sdvx {
        #[serde(rename = "inGameID")]
        in_game_id: u32,
    },
}

/// Canonical reference to one playable chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartIdentity {
    #[serde(rename = "chartID")]
    pub chart_id: String,
    #[serde(rename = "songID")]
    pub song_id: u32,
    pub game: Game,
    pub playtype: Playtype,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub versions: Vec<String>,
    pub data: ChartData,
}

impl ChartIdentity {
    pub fn in_game_id(&self) -> Option<u32> {
        match &self.data {
            ChartData::Iidx { in_game_id, .. } => *in_game_id,
            ChartData::Sdvx { in_game_id } => Some(*in_game_id),
        }
    }

    pub fn appears_in(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }
}

/// How a source identifies a chart's difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DifficultySelector {
    Exact(Difficulty),
    /// Any of SDVX's fourth-slot difficulties (INF, GRV, HVN, VVD, XCD)
    AnyInfinite,
}

impl DifficultySelector {
    pub fn matches(&self, difficulty: &Difficulty) -> bool {
        match self {
            DifficultySelector::Exact(d) => d == difficulty,
            DifficultySelector::AnyInfinite => {
                matches!(difficulty, Difficulty::Sdvx(d) if d.is_infinite_family())
            }
        }
    }
}

impl std::fmt::Display for DifficultySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DifficultySelector::Exact(d) => write!(f, "{}", d),
            DifficultySelector::AnyInfinite => f.write_str("ANY_INF"),
        }
    }
}

/// The identifier a chart lookup is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartLookup {
    InGameId(u32),
    SongId(u32),
}

/// A chart lookup against the reference catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartQuery {
    pub game: Game,
    pub playtype: Playtype,
    pub lookup: ChartLookup,
    pub difficulty: DifficultySelector,
    /// When set, only charts present in this version match
    pub version: Option<String>,
}

impl ChartQuery {
    pub fn matches(&self, chart: &ChartIdentity) -> bool {
        if chart.game != self.game || chart.playtype != self.playtype {
            return false;
        }

        let id_matches = match self.lookup {
            ChartLookup::InGameId(id) => chart.in_game_id() == Some(id),
            ChartLookup::SongId(id) => chart.song_id == id,
        };

        id_matches
            && self.difficulty.matches(&chart.difficulty)
            && self
                .version
                .as_deref()
                .map_or(true, |v| chart.appears_in(v))
    }
}
