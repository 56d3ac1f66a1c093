use score_core::{ChartData, ChartIdentity, Game, Grade, IidxGrade, SdvxGrade};

use crate::pipeline::processing::convert::ConverterFailure;

/// SDVX scores are out of ten million on every chart
pub const SDVX_MAX_SCORE: u32 = 10_000_000;

// Boundaries are fractions of the maximum score, highest first. Integer
// fractions keep IIDX's ninths exact.
const SDVX_GRADES: &[(SdvxGrade, u64, u64)] = &[
    (SdvxGrade::Puc, 1, 1),
    (SdvxGrade::S, 99, 100),
    (SdvxGrade::AAAPlus, 98, 100),
    (SdvxGrade::AAA, 97, 100),
    (SdvxGrade::AAPlus, 95, 100),
    (SdvxGrade::AA, 93, 100),
    (SdvxGrade::APlus, 90, 100),
    (SdvxGrade::A, 87, 100),
    (SdvxGrade::B, 80, 100),
    (SdvxGrade::C, 70, 100),
];

const IIDX_GRADES: &[(IidxGrade, u64, u64)] = &[
    (IidxGrade::Max, 1, 1),
    (IidxGrade::MaxMinus, 17, 18),
    (IidxGrade::AAA, 8, 9),
    (IidxGrade::AA, 7, 9),
    (IidxGrade::A, 6, 9),
    (IidxGrade::B, 5, 9),
    (IidxGrade::C, 4, 9),
    (IidxGrade::D, 3, 9),
    (IidxGrade::E, 2, 9),
];

/// The highest score achievable on a chart
pub fn max_score(game: Game, chart: &ChartIdentity) -> Result<u32, ConverterFailure> {
    if chart.game != game {
        return Err(ConverterFailure::internal(format!(
            "Chart {} is for {}, but was used to grade a {} score.",
            chart.chart_id, chart.game, game
        )));
    }

    match (game, &chart.data) {
        (Game::Sdvx, _) => Ok(SDVX_MAX_SCORE),
        (Game::Iidx, ChartData::Iidx { notecount, .. }) if *notecount > 0 => Ok(notecount * 2),
        (Game::Iidx, _) => Err(ConverterFailure::internal(format!(
            "IIDX chart {} has no usable notecount.",
            chart.chart_id
        ))),
    }
}

/// Percent of the maximum score, 0 to 100. A score beyond the chart's maximum
/// means the record is wrong.
pub fn calculate_percent(game: Game, score: u32, chart: &ChartIdentity) -> Result<f64, ConverterFailure> {
    let max = max_score(game, chart)?;
    let percent = f64::from(score) / f64::from(max) * 100.0;

    if score > max {
        return Err(ConverterFailure::invalid(format!(
            "Invalid percent of {:.2} - expected a value between 0 and 100 (score {} exceeds the maximum of {} on chart {}).",
            percent, score, max, chart.chart_id
        )));
    }

    Ok(percent)
}

fn grade_for<G: Copy>(table: &[(G, u64, u64)], floor: G, score: u64, max: u64) -> G {
    table
        .iter()
        .find(|(_, num, den)| score * den >= max * num)
        .map(|(grade, _, _)| *grade)
        .unwrap_or(floor)
}

/// Grade from the game's fixed boundary table
pub fn grade_from_score(game: Game, score: u32, max: u32) -> Grade {
    let (score, max) = (u64::from(score), u64::from(max));
    match game {
        Game::Sdvx => Grade::Sdvx(grade_for(SDVX_GRADES, SdvxGrade::D, score, max)),
        Game::Iidx => Grade::Iidx(grade_for(IIDX_GRADES, IidxGrade::F, score, max)),
    }
}

/// Derive grade and percent from a raw score and the chart it was set on.
/// Any grade the source supplied is ignored.
pub fn grade_and_percent(
    game: Game,
    score: u32,
    chart: &ChartIdentity,
) -> Result<(Grade, f64), ConverterFailure> {
    let percent = calculate_percent(game, score, chart)?;
    let max = max_score(game, chart)?;
    Ok((grade_from_score(game, score, max), percent))
}
