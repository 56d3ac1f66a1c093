use tracing::{debug, info};

use score_core::{Game, Playtype};

use super::{ParseError, ParsedImport, Parser};
use crate::pipeline::processing::convert::converters::{IidxCsvContext, IidxCsvScore};
use crate::pipeline::processing::convert::ImportContext;
use crate::pipeline::processing::normalize::iidx::{
    csv_difficulties, is_known_version, version_has_beginner_and_legg, LAST_PRE_HV_VERSION,
    LATEST_IIDX_CSV_VERSION,
};

// version, title, genre, artist, play count
const LEADING_COLUMNS: usize = 5;
// level, EX score, PGreat, Great, miss count, clear type, DJ level
const COLUMNS_PER_DIFFICULTY: usize = 7;
const TITLE_COLUMN: usize = 1;

fn expected_columns(has_beginner_and_legg: bool) -> usize {
    LEADING_COLUMNS + csv_difficulties(has_beginner_and_legg).len() * COLUMNS_PER_DIFFICULTY + 1
}

/// Work out the column layout from the header row
fn detect_layout(header: &str) -> Result<bool, ParseError> {
    let columns = header.split(',').count();
    if columns == expected_columns(true) {
        Ok(true)
    } else if columns == expected_columns(false) {
        Ok(false)
    } else {
        Err(ParseError::UnknownLayout { columns })
    }
}

fn resolve_version(version_hint: Option<&str>, has_beginner_and_legg: bool) -> Result<String, ParseError> {
    let version = match version_hint.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ if has_beginner_and_legg => LATEST_IIDX_CSV_VERSION.to_string(),
        _ => LAST_PRE_HV_VERSION.to_string(),
    };

    if !is_known_version(&version) {
        return Err(ParseError::UnknownVersion(version));
    }
    if version_has_beginner_and_legg(&version) != has_beginner_and_legg {
        return Err(ParseError::VersionLayoutMismatch { version });
    }
    Ok(version)
}

/// Parse an IIDX score CSV as exported by e-amusement or PLI.
///
/// Each played difficulty of each row becomes one record. Difficulties whose
/// clear type is NO PLAY are skipped.
pub fn parse_eamusement_iidx_csv(
    bytes: &[u8],
    service: &str,
    playtype: Playtype,
    version_hint: Option<&str>,
) -> Result<ParsedImport, ParseError> {
    if !Game::Iidx.supports(playtype) {
        return Err(ParseError::UnsupportedPlaytype {
            game: Game::Iidx,
            playtype,
        });
    }

    let text = std::str::from_utf8(bytes)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, header) = lines.next().ok_or(ParseError::MissingHeader)?;
    let has_beginner_and_legg = detect_layout(header)?;
    let version = resolve_version(version_hint, has_beginner_and_legg)?;
    let expected = expected_columns(has_beginner_and_legg);
    let difficulties = csv_difficulties(has_beginner_and_legg);

    debug!(
        "IIDX CSV: version={} hv_layout={} columns={}",
        version, has_beginner_and_legg, expected
    );

    let mut records = Vec::new();
    for (line, row) in lines {
        let cells: Vec<&str> = row.split(',').collect();
        if cells.len() != expected {
            return Err(ParseError::RowLength {
                line,
                expected,
                found: cells.len(),
            });
        }

        let title = cells[TITLE_COLUMN].trim();
        let timestamp = cells[expected - 1].trim();

        for (i, difficulty) in difficulties.iter().enumerate() {
            let start = LEADING_COLUMNS + i * COLUMNS_PER_DIFFICULTY;
            let block = &cells[start..start + COLUMNS_PER_DIFFICULTY];

            if block[5].trim() == "NO PLAY" {
                continue;
            }

            let score = IidxCsvScore {
                title: title.to_string(),
                difficulty: *difficulty,
                level: block[0].trim().to_string(),
                ex_score: block[1].trim().to_string(),
                pgreat: block[2].trim().to_string(),
                great: block[3].trim().to_string(),
                miss_count: block[4].trim().to_string(),
                lamp: block[5].trim().to_string(),
                dj_level: block[6].trim().to_string(),
                timestamp: timestamp.to_string(),
            };
            records.push(serde_json::to_value(score)?);
        }
    }

    info!("IIDX CSV: extracted {} scores for {}", records.len(), service);

    let context = ImportContext {
        service: service.to_string(),
        user_id: None,
        data: serde_json::to_value(IidxCsvContext {
            playtype,
            version,
            has_beginner_and_legg,
        })?,
    };

    Ok(ParsedImport { records, context })
}

pub struct EamusementIidxCsvParser {
    pub service: String,
    pub playtype: Playtype,
    pub version_hint: Option<String>,
}

impl EamusementIidxCsvParser {
    pub fn new(service: String, playtype: Playtype, version_hint: Option<String>) -> Self {
        Self {
            service,
            playtype,
            version_hint,
        }
    }
}

impl Parser for EamusementIidxCsvParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedImport, ParseError> {
        parse_eamusement_iidx_csv(bytes, &self.service, self.playtype, self.version_hint.as_deref())
    }
}

#[cfg(test)]
pub(crate) mod samples {
    pub const PRE_HV_HEADER: &str = "バージョン,タイトル,ジャンル,アーティスト,プレー回数,\
NORMAL 難易度,NORMAL スコア,NORMAL PGreat,NORMAL Great,NORMAL ミスカウント,NORMAL クリアタイプ,NORMAL DJ LEVEL,\
HYPER 難易度,HYPER スコア,HYPER PGreat,HYPER Great,HYPER ミスカウント,HYPER クリアタイプ,HYPER DJ LEVEL,\
ANOTHER 難易度,ANOTHER スコア,ANOTHER PGreat,ANOTHER Great,ANOTHER ミスカウント,ANOTHER クリアタイプ,ANOTHER DJ LEVEL,\
最終プレー日時";

    pub const HV_HEADER: &str = "バージョン,タイトル,ジャンル,アーティスト,プレー回数,\
BEGINNER 難易度,BEGINNER スコア,BEGINNER PGreat,BEGINNER Great,BEGINNER ミスカウント,BEGINNER クリアタイプ,BEGINNER DJ LEVEL,\
NORMAL 難易度,NORMAL スコア,NORMAL PGreat,NORMAL Great,NORMAL ミスカウント,NORMAL クリアタイプ,NORMAL DJ LEVEL,\
HYPER 難易度,HYPER スコア,HYPER PGreat,HYPER Great,HYPER ミスカウント,HYPER クリアタイプ,HYPER DJ LEVEL,\
ANOTHER 難易度,ANOTHER スコア,ANOTHER PGreat,ANOTHER Great,ANOTHER ミスカウント,ANOTHER クリアタイプ,ANOTHER DJ LEVEL,\
LEGGENDARIA 難易度,LEGGENDARIA スコア,LEGGENDARIA PGreat,LEGGENDARIA Great,LEGGENDARIA ミスカウント,LEGGENDARIA クリアタイプ,LEGGENDARIA DJ LEVEL,\
最終プレー日時";

    const UNPLAYED: &str = "0,0,0,0,---,NO PLAY,---";

    /// A row in the HV layout with only ANOTHER and LEGGENDARIA played
    pub fn hv_row(title: &str, another: &str, leggendaria: &str) -> String {
        format!(
            "HEROIC VERSE,{},TECHNO,artist,12,{},{},{},{},{},2022-03-01 21:00",
            title, UNPLAYED, UNPLAYED, UNPLAYED, another, leggendaria
        )
    }

    pub fn pre_hv_row(title: &str, another: &str) -> String {
        format!(
            "Rootage,{},TECHNO,artist,3,{},{},{},2019-05-01 12:00",
            title, UNPLAYED, UNPLAYED, another
        )
    }
}
