//! Pure mappings from source encodings to canonical values.
//!
//! Every function here is total over the inputs it documents and returns an
//! invalid-score failure for anything else.

pub mod dates;
pub mod iidx;
pub mod score_utils;
pub mod sdvx;

pub use dates::{parse_date_from_string, parse_unix_millis, SourceTimezone};
pub use score_utils::{grade_and_percent, SDVX_MAX_SCORE};

use score_core::{Difficulty, Game, Judgements, Lamp};

use crate::pipeline::processing::convert::ConverterFailure;

/// Judgement names each game records
pub fn judgement_keys(game: Game) -> &'static [&'static str] {
    match game {
        Game::Iidx => &["pgreat", "great", "good", "bad", "poor"],
        Game::Sdvx => &["critical", "near", "miss"],
    }
}

/// Reject judgement names the game does not have
pub fn validate_judgements(game: Game, judgements: &Judgements) -> Result<(), ConverterFailure> {
    let allowed = judgement_keys(game);
    match judgements.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(key) => Err(ConverterFailure::invalid(format!(
            "Invalid judgement '{}' for {} - expected one of {}.",
            key,
            game,
            allowed.join(", ")
        ))),
        None => Ok(()),
    }
}

/// Canonical lamp name, validated for the game
pub fn parse_lamp(game: Game, lamp: &str) -> Result<Lamp, ConverterFailure> {
    Lamp::parse(game, lamp).map_err(|_| {
        ConverterFailure::invalid(format!("Invalid lamp of '{}' for {}.", lamp, game))
    })
}

/// Canonical difficulty name, validated for the game
pub fn parse_difficulty(game: Game, difficulty: &str) -> Result<Difficulty, ConverterFailure> {
    Difficulty::parse(game, difficulty).map_err(|_| {
        ConverterFailure::invalid(format!(
            "Invalid difficulty of '{}' for {}.",
            difficulty, game
        ))
    })
}
