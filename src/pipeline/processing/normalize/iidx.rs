//! IIDX encodings used by e-amusement and PLI score CSVs.

use score_core::{IidxDifficulty, IidxLamp};

use crate::pipeline::processing::convert::ConverterFailure;

/// IIDX versions score CSVs can be imported for, oldest first
pub const IIDX_CSV_VERSIONS: &[&str] = &["26", "27", "28", "29", "30"];

/// The last version whose CSV export lacks BEGINNER and LEGGENDARIA columns
pub const LAST_PRE_HV_VERSION: &str = "26";

pub const LATEST_IIDX_CSV_VERSION: &str = "30";

const CSV_LAMPS: &[(&str, IidxLamp)] = &[
    ("NO PLAY", IidxLamp::NoPlay),
    ("FAILED", IidxLamp::Failed),
    ("ASSIST CLEAR", IidxLamp::AssistClear),
    ("EASY CLEAR", IidxLamp::EasyClear),
    ("CLEAR", IidxLamp::Clear),
    ("HARD CLEAR", IidxLamp::HardClear),
    ("EX HARD CLEAR", IidxLamp::ExHardClear),
    ("FULLCOMBO CLEAR", IidxLamp::FullCombo),
];

const PRE_HV_DIFFICULTIES: &[IidxDifficulty] = &[
    IidxDifficulty::Normal,
    IidxDifficulty::Hyper,
    IidxDifficulty::Another,
];

const HV_DIFFICULTIES: &[IidxDifficulty] = &[
    IidxDifficulty::Beginner,
    IidxDifficulty::Normal,
    IidxDifficulty::Hyper,
    IidxDifficulty::Another,
    IidxDifficulty::Leggendaria,
];

pub fn convert_csv_lamp(clear_type: &str) -> Result<IidxLamp, ConverterFailure> {
    CSV_LAMPS
        .iter()
        .find(|(name, _)| *name == clear_type)
        .map(|(_, lamp)| *lamp)
        .ok_or_else(|| {
            ConverterFailure::invalid(format!(
                "Invalid lamp of '{}' - Could not convert.",
                clear_type
            ))
        })
}

pub fn encode_csv_lamp(lamp: IidxLamp) -> &'static str {
    CSV_LAMPS
        .iter()
        .find(|(_, l)| *l == lamp)
        .map(|(name, _)| *name)
        .unwrap_or("NO PLAY")
}

/// Difficulty column groups, in the order they appear in the export
pub fn csv_difficulties(has_beginner_and_legg: bool) -> &'static [IidxDifficulty] {
    if has_beginner_and_legg {
        HV_DIFFICULTIES
    } else {
        PRE_HV_DIFFICULTIES
    }
}

pub fn is_known_version(version: &str) -> bool {
    IIDX_CSV_VERSIONS.contains(&version)
}

/// Whether a version's export has BEGINNER and LEGGENDARIA columns
pub fn version_has_beginner_and_legg(version: &str) -> bool {
    version
        .parse::<u32>()
        .ok()
        .zip(LAST_PRE_HV_VERSION.parse::<u32>().ok())
        .map_or(false, |(v, last)| v > last)
}

/// Parse an integer CSV cell. "---" is how the export writes "unknown".
pub fn parse_csv_count(field: &str, value: &str) -> Result<Option<u32>, ConverterFailure> {
    let value = value.trim();
    if value == "---" || value.is_empty() {
        return Ok(None);
    }

    value.parse::<u32>().map(Some).map_err(|_| {
        ConverterFailure::invalid(format!(
            "Invalid {} of '{}' - expected a non-negative integer.",
            field, value
        ))
    })
}
