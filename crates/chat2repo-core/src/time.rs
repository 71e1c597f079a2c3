//! Relative time labels and lenient timestamp parsing.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Human-friendly age of `timestamp` as seen at `now`.
///
/// Under a minute (or in the future) is "just now", then whole minutes, then
/// whole hours; anything a day or older is shown as a local `M/D HH:MM` date.
pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);

    if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        plural(elapsed.num_minutes(), "minute")
    } else if elapsed.num_hours() < 24 {
        plural(elapsed.num_hours(), "hour")
    } else {
        timestamp
            .with_timezone(&Local)
            .format("%-m/%-d %H:%M")
            .to_string()
    }
}

/// [`format_relative_time`] against the current clock.
pub fn format_relative_from_now(timestamp: DateTime<Utc>) -> String {
    format_relative_time(timestamp, Utc::now())
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// Parses an RFC 3339 timestamp, or a naive ISO 8601 one taken as local time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}
