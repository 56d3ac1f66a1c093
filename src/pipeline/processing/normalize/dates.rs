use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};

use crate::pipeline::processing::convert::ConverterFailure;

const JST_OFFSET_SECS: i32 = 9 * 3600;

// Naive formats seen in exports, most specific first
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// The offset a source writes naive timestamps in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTimezone {
    Utc,
    /// e-amusement and PLI exports are in Japan time
    Jst,
}

impl SourceTimezone {
    pub fn offset(&self) -> FixedOffset {
        match self {
            SourceTimezone::Utc => Utc.fix(),
            SourceTimezone::Jst => FixedOffset::east_opt(JST_OFFSET_SECS).unwrap_or_else(|| Utc.fix()),
        }
    }
}

/// Parse a source date string. Missing or blank input means the source did not
/// record a time; anything else that fails to parse is an invalid score.
pub fn parse_date_from_string(
    input: Option<&str>,
    zone: SourceTimezone,
) -> Result<Option<DateTime<Utc>>, ConverterFailure> {
    let raw = match input.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    let offset = zone.offset();
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            if let Some(local) = offset.from_local_datetime(&naive).single() {
                return Ok(Some(local.with_timezone(&Utc)));
            }
        }
    }

    Err(ConverterFailure::invalid(format!(
        "Invalid/Unparseable date of '{}'.",
        raw
    )))
}

/// Unix milliseconds, as sent by client integrations
pub fn parse_unix_millis(millis: Option<i64>) -> Result<Option<DateTime<Utc>>, ConverterFailure> {
    match millis {
        None => Ok(None),
        Some(ms) if ms < 0 => Err(ConverterFailure::invalid(format!(
            "Invalid timeAchieved of {} - expected a non-negative unix timestamp in milliseconds.",
            ms
        ))),
        Some(ms) => DateTime::<Utc>::from_timestamp_millis(ms).map(Some).ok_or_else(|| {
            ConverterFailure::invalid(format!(
                "Invalid timeAchieved of {} - out of range.",
                ms
            ))
        }),
    }
}
