use crate::loader::RawTable;
use crate::model::PlayEvent;
use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset, Weekday};

/// Timestamp column candidates, first match wins.
pub const TIMESTAMP_COLUMNS: [&str; 4] = ["endTime", "Play Time", "timestamp", "dateTime"];

/// Duration-in-milliseconds column candidates, first match wins.
pub const DURATION_COLUMNS: [&str; 3] = ["msPlayed", "Duration_ms", "duration_ms"];

pub const ARTIST_COLUMN: &str = "artistName";
pub const TRACK_COLUMN: &str = "trackName";

const MILLIS_PER_DAY: u64 = 86_400_000;

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub events: Vec<PlayEvent>,
    pub has_duration: bool,
    pub warnings: Vec<String>,
}

/// Turns a raw table into play events: locates the timestamp and duration
/// columns, derives the calendar and listening-time fields, and leaves the
/// raw source columns behind. A missing timestamp column or an unparseable
/// timestamp cell is terminal; a missing duration column only warns.
pub fn normalize(table: &RawTable) -> Result<Dataset> {
    let Some(timestamp_column) = first_match(table, &TIMESTAMP_COLUMNS) else {
        bail!(
            "timestamp column not found; expected one of: {}",
            TIMESTAMP_COLUMNS.join(", ")
        );
    };
    let duration_column = first_match(table, &DURATION_COLUMNS);

    let mut warnings = Vec::new();
    if duration_column.is_none() {
        warnings.push(String::from(
            "duration column not found; listening-time fields are unavailable",
        ));
    }

    let mut events = Vec::with_capacity(table.rows.len());
    for (index, row) in table.rows.iter().enumerate() {
        let raw_stamp = row
            .get(timestamp_column)
            .and_then(cell_text)
            .ok_or_else(|| anyhow!("row {}: missing {timestamp_column} value", index + 1))?;
        let played_at = parse_timestamp(&raw_stamp)
            .with_context(|| format!("row {}: invalid timestamp {raw_stamp:?}", index + 1))?;

        let millis = duration_column
            .and_then(|column| row.get(column))
            .and_then(cell_millis);
        let (hours_played, minutes_played) = match millis {
            Some(ms) => {
                let (hours, minutes) = listening_time(ms);
                (Some(hours), Some(minutes))
            }
            None => (None, None),
        };

        events.push(PlayEvent {
            artist: row.get(ARTIST_COLUMN).and_then(cell_text),
            track: row.get(TRACK_COLUMN).and_then(cell_text),
            played_at,
            year: played_at.year(),
            month: u8::from(played_at.month()),
            day: played_at.day(),
            weekday: played_at.weekday().number_days_from_monday(),
            weekday_name: weekday_name(played_at.weekday()),
            hour: played_at.hour(),
            hours_played,
            minutes_played,
        });
    }

    Ok(Dataset {
        events,
        has_duration: duration_column.is_some(),
        warnings,
    })
}

fn first_match<'a>(table: &RawTable, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .find(|candidate| table.has_column(candidate))
}

/// Accepts `YYYY-MM-DD HH:MM[:SS]` (with space or `T`) and RFC 3339.
/// Offsets are folded into UTC before the calendar decomposition.
pub fn parse_timestamp(raw: &str) -> Result<PrimitiveDateTime> {
    let text = raw.trim();
    if let Ok(stamp) = OffsetDateTime::parse(text, &Rfc3339) {
        let utc = stamp.to_offset(UtcOffset::UTC);
        return Ok(PrimitiveDateTime::new(utc.date(), utc.time()));
    }

    let mut normalized = text.replacen('T', " ", 1);
    if normalized.len() == 16 {
        normalized.push_str(":00");
    }
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    PrimitiveDateTime::parse(&normalized, format).map_err(|_| anyhow!("unrecognized date-time"))
}

/// Millisecond duration to (hours, minutes), both rounded to 3 decimals,
/// using the integer day/seconds decomposition: sub-day whole seconds feed
/// the fractions, full days feed the `days * 24` / `days * 1440` terms. The
/// minutes term wraps at 60 by definition.
pub fn listening_time(millis: u64) -> (f64, f64) {
    let days = millis / MILLIS_PER_DAY;
    let seconds = ((millis % MILLIS_PER_DAY) / 1000) as f64;
    let hours = seconds / 3600.0 + days as f64 * 24.0;
    let minutes = (seconds / 60.0) % 60.0 + days as f64 * 1440.0;
    (round3(hours), round3(minutes))
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Null | Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

fn cell_millis(value: &Value) -> Option<u64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (number.is_finite() && number >= 0.0).then_some(number.trunc() as u64)
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Monday",
        Weekday::Tuesday => "Tuesday",
        Weekday::Wednesday => "Wednesday",
        Weekday::Thursday => "Thursday",
        Weekday::Friday => "Friday",
        Weekday::Saturday => "Saturday",
        Weekday::Sunday => "Sunday",
    }
}
