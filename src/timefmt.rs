//! Short time-of-day formatting for history timestamps
//!
//! Turns the `recvTime` strings returned by the history API into the
//! `HH:MM:SS` labels shown under each bar (24-hour clock, pt-BR style).
//! Anything that does not parse is handed back untouched.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Output format: hours, minutes and seconds on a 24-hour clock
const SHORT_TIME_FORMAT: &str = "%H:%M:%S";

/// Naive layouts accepted when the timestamp carries no offset
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Format a timestamp in the machine's local time zone.
pub fn format_short_time(iso: &str) -> String {
    format_short_time_in(iso, &Local)
}

/// Format a timestamp in the given time zone.
///
/// Returns the input unchanged when it is empty or cannot be parsed.
pub fn format_short_time_in<Tz>(iso: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(iso, tz) {
        Some(instant) => instant.format(SHORT_TIME_FORMAT).to_string(),
        None => iso.to_string(),
    }
}

/// Parse an ISO-8601 timestamp into the target zone.
///
/// Offset-less date-times are read as wall-clock time in `tz`; a bare date
/// is midnight UTC.
pub fn parse_timestamp<Tz: TimeZone>(iso: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    if iso.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(iso) {
        return Some(dt.with_timezone(tz));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(iso, format) {
            return tz.from_local_datetime(&naive).earliest();
        }
    }

    NaiveDate::parse_from_str(iso, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).with_timezone(tz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_rfc3339_utc() {
        assert_eq!(format_short_time_in("2024-01-01T10:00:00Z", &Utc), "10:00:00");
        assert_eq!(
            format_short_time_in("2024-01-01T10:00:05.123Z", &Utc),
            "10:00:05"
        );
    }

    #[test]
    fn test_converts_to_target_zone() {
        let brt = FixedOffset::west_opt(3 * 3600).unwrap();
        assert_eq!(format_short_time_in("2024-01-01T10:00:00Z", &brt), "07:00:00");
        assert_eq!(
            format_short_time_in("2024-01-01T10:00:00+02:00", &Utc),
            "08:00:00"
        );
    }

    #[test]
    fn test_naive_and_date_only() {
        assert_eq!(format_short_time_in("2024-01-01T23:15:09", &Utc), "23:15:09");
        assert_eq!(format_short_time_in("2024-01-01 06:07:08", &Utc), "06:07:08");
        assert_eq!(format_short_time_in("2024-01-01", &Utc), "00:00:00");
    }

    #[test]
    fn test_unparseable_returns_input() {
        assert_eq!(format_short_time_in("", &Utc), "");
        assert_eq!(format_short_time_in("yesterday", &Utc), "yesterday");
        assert_eq!(format_short_time_in("2024-13-45T99:00:00Z", &Utc), "2024-13-45T99:00:00Z");
    }

    #[test]
    fn test_local_zone_is_non_empty() {
        let formatted = format_short_time("2024-01-01T10:00:00Z");
        assert_eq!(formatted.len(), 8);
        assert_ne!(formatted, "2024-01-01T10:00:00Z");
    }
}
