use thiserror::Error;

/// Errors raised while reading the reference catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog unavailable: {message}")]
    Unavailable { message: String },

    #[error("Catalog lock poisoned: {0}")]
    Poisoned(String),
}

/// A string did not name a known canonical value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} '{value}'")]
pub struct DomainError {
    pub kind: &'static str,
    pub value: String,
}

impl DomainError {
    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// A song, chart and dry score that do not describe the same play.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("Chart {chart_id} belongs to song {chart_song_id}, not song {song_id}")]
    SongMismatch {
        chart_id: String,
        chart_song_id: u32,
        song_id: u32,
    },

    #[error("Chart {chart_id} is for {chart_game} but the song is for {song_game}")]
    SongGameMismatch {
        chart_id: String,
        chart_game: String,
        song_game: String,
    },

    #[error("Score is for {score} but chart {chart_id} is for {chart}")]
    ScoreChartMismatch {
        chart_id: String,
        score: String,
        chart: String,
    },

    #[error("Score {field} '{value}' does not belong to {game}")]
    ForeignValue {
        field: &'static str,
        value: String,
        game: String,
    },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
