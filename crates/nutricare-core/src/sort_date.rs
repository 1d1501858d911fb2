//! Sort-timestamp resolution for loaded records.
//!
//! The save date has been written as a store-assigned `{seconds, nanos}`
//! pair, a client RFC 3339 string, and assorted form-entered date strings,
//! depending on the writer generation. Every record gets exactly one sort
//! timestamp through the fallback chain below; resolution is pure and total
//! — unusable input sorts at the epoch, last.

use jiff::civil;
use jiff::tz::TimeZone;
use jiff::Timestamp;
use serde_json::Value;

use crate::models::assessment::lookup_path;

/// Form-entered fields scanned when neither save timestamp is usable,
/// highest priority first.
const DATE_CANDIDATES: [&str; 5] = [
    "generalInfo.assessmentDate",
    "followUpDetails.followUpDate",
    "assessmentDate",
    "nextAssessmentDate",
    "date",
];

/// The one sort timestamp for a document. Never fails.
pub fn sort_timestamp(doc: &Value) -> Timestamp {
    server_timestamp(doc)
        .or_else(|| {
            doc.get("savedAt")
                .and_then(Value::as_str)
                .and_then(parse_date_value)
        })
        .or_else(|| candidate_scan(doc))
        .unwrap_or(Timestamp::UNIX_EPOCH)
}

/// Store-assigned `savedAtServer: {seconds, nanos}` stamp.
fn server_timestamp(doc: &Value) -> Option<Timestamp> {
    let stamp = doc.get("savedAtServer")?;
    let seconds = stamp.get("seconds")?.as_i64()?;
    let nanos = stamp.get("nanos").and_then(Value::as_i64).unwrap_or(0);
    Timestamp::new(seconds, nanos as i32).ok()
}

fn candidate_scan(doc: &Value) -> Option<Timestamp> {
    DATE_CANDIDATES.iter().find_map(|path| {
        lookup_path(doc, path)
            .and_then(Value::as_str)
            .and_then(parse_date_value)
    })
}

/// Parse a date string in any representation a writer has used: RFC 3339
/// timestamp, `YYYY-MM-DD`, or `DD/MM/YYYY`. Anything else is skipped.
pub fn parse_date_value(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = raw.parse::<Timestamp>() {
        return Some(ts);
    }
    if let Ok(date) = raw.parse::<civil::Date>() {
        return midnight_utc(date);
    }
    parse_slash_date(raw)
}

fn parse_slash_date(raw: &str) -> Option<Timestamp> {
    let mut parts = raw.split('/');
    let day: i8 = parts.next()?.trim().parse().ok()?;
    let month: i8 = parts.next()?.trim().parse().ok()?;
    let year: i16 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let date = civil::Date::new(year, month, day).ok()?;
    midnight_utc(date)
}

fn midnight_utc(date: civil::Date) -> Option<Timestamp> {
    date.to_zoned(TimeZone::UTC)
        .ok()
        .map(|zoned| zoned.timestamp())
}
