//! SDVX encodings used by CG-family APIs.
//!
//! CG sends the game version, difficulty and clear type as integers. Clear
//! types shift between versions: BOOTH has no EXCESSIVE CLEAR, so its codes
//! for ULTIMATE CHAIN and PERFECT ULTIMATE CHAIN are one lower than in every
//! later version. Each version therefore gets its own table.

use serde::{Deserialize, Serialize};
use std::fmt;

use score_core::{Difficulty, DifficultySelector, SdvxDifficulty, SdvxLamp};

use crate::pipeline::processing::convert::ConverterFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdvxVersion {
    Booth,
    Inf,
    Gw,
    Heaven,
    Vivid,
    Exceed,
}

impl SdvxVersion {
    pub const ALL: [SdvxVersion; 6] = [
        SdvxVersion::Booth,
        SdvxVersion::Inf,
        SdvxVersion::Gw,
        SdvxVersion::Heaven,
        SdvxVersion::Vivid,
        SdvxVersion::Exceed,
    ];

    /// Version tag as stored on charts
    pub fn as_str(&self) -> &'static str {
        match self {
            SdvxVersion::Booth => "booth",
            SdvxVersion::Inf => "inf",
            SdvxVersion::Gw => "gw",
            SdvxVersion::Heaven => "heaven",
            SdvxVersion::Vivid => "vivid",
            SdvxVersion::Exceed => "exceed",
        }
    }
}

impl fmt::Display for SdvxVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const BOOTH_LAMPS: &[(i64, SdvxLamp)] = &[
    (0, SdvxLamp::Failed),
    (1, SdvxLamp::Clear),
    (2, SdvxLamp::UltimateChain),
    (3, SdvxLamp::PerfectUltimateChain),
];

const EXCESSIVE_CLEAR_LAMPS: &[(i64, SdvxLamp)] = &[
    (0, SdvxLamp::Failed),
    (1, SdvxLamp::Clear),
    (2, SdvxLamp::ExcessiveClear),
    (3, SdvxLamp::UltimateChain),
    (4, SdvxLamp::PerfectUltimateChain),
];

/// The clear-type table CG uses for a version
pub fn cg_lamp_table(version: SdvxVersion) -> &'static [(i64, SdvxLamp)] {
    match version {
        SdvxVersion::Booth => BOOTH_LAMPS,
        SdvxVersion::Inf => EXCESSIVE_CLEAR_LAMPS,
        SdvxVersion::Gw => EXCESSIVE_CLEAR_LAMPS,
        SdvxVersion::Heaven => EXCESSIVE_CLEAR_LAMPS,
        SdvxVersion::Vivid => EXCESSIVE_CLEAR_LAMPS,
        SdvxVersion::Exceed => EXCESSIVE_CLEAR_LAMPS,
    }
}

pub fn convert_cg_lamp(version: SdvxVersion, clear_type: i64) -> Result<SdvxLamp, ConverterFailure> {
    cg_lamp_table(version)
        .iter()
        .find(|(code, _)| *code == clear_type)
        .map(|(_, lamp)| *lamp)
        .ok_or_else(|| {
            ConverterFailure::invalid(format!(
                "Invalid lamp of {} for {} - Could not convert.",
                clear_type, version
            ))
        })
}

/// Inverse of [`convert_cg_lamp`]; `None` if the version has no such lamp
pub fn encode_cg_lamp(version: SdvxVersion, lamp: SdvxLamp) -> Option<i64> {
    cg_lamp_table(version)
        .iter()
        .find(|(_, l)| *l == lamp)
        .map(|(code, _)| *code)
}

pub fn convert_cg_version(code: i64) -> Result<SdvxVersion, ConverterFailure> {
    match code {
        1 => Ok(SdvxVersion::Booth),
        2 => Ok(SdvxVersion::Inf),
        3 => Ok(SdvxVersion::Gw),
        4 => Ok(SdvxVersion::Heaven),
        5 => Ok(SdvxVersion::Vivid),
        6 => Ok(SdvxVersion::Exceed),
        _ => Err(ConverterFailure::invalid(format!("Unknown Game Version {}.", code))),
    }
}

pub fn encode_cg_version(version: SdvxVersion) -> i64 {
    match version {
        SdvxVersion::Booth => 1,
        SdvxVersion::Inf => 2,
        SdvxVersion::Gw => 3,
        SdvxVersion::Heaven => 4,
        SdvxVersion::Vivid => 5,
        SdvxVersion::Exceed => 6,
    }
}

/// CG reports the whole fourth-slot family as one code, so code 3 selects
/// whichever of INF/GRV/HVN/VVD/XCD the song has.
pub fn convert_cg_difficulty(code: i64) -> Result<DifficultySelector, ConverterFailure> {
    let exact = |d: SdvxDifficulty| -> Result<DifficultySelector, ConverterFailure> {
        Ok(DifficultySelector::Exact(Difficulty::Sdvx(d)))
    };
    match code {
        0 => exact(SdvxDifficulty::Nov),
        1 => exact(SdvxDifficulty::Adv),
        2 => exact(SdvxDifficulty::Exh),
        3 => Ok(DifficultySelector::AnyInfinite),
        4 => exact(SdvxDifficulty::Mxm),
        _ => Err(ConverterFailure::invalid(format!(
            "Invalid difficulty of {} - Could not convert.",
            code
        ))),
    }
}

pub fn encode_cg_difficulty(difficulty: SdvxDifficulty) -> i64 {
    match difficulty {
        SdvxDifficulty::Nov => 0,
        SdvxDifficulty::Adv => 1,
        SdvxDifficulty::Exh => 2,
        SdvxDifficulty::Inf
        | SdvxDifficulty::Grv
        | SdvxDifficulty::Hvn
        | SdvxDifficulty::Vvd
        | SdvxDifficulty::Xcd => 3,
        SdvxDifficulty::Mxm => 4,
    }
}
