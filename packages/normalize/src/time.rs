//! Timestamp parsing and calendar derivations.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Format used when writing timestamps back into the working table.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses an ISO-8601 timestamp, with or without a UTC offset.
///
/// Offsets are dropped and the wall-clock time is kept, so
/// `"2022-01-01 00:00:00+00"` and `"2022-01-01T00:00:00"` are equal. A bare
/// date parses as midnight.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.naive_local());
        }
    }
    for format in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Midnight on the given calendar day, or `None` if the day does not exist.
#[must_use]
pub fn midnight(year: i32, month: u32, day: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn parses_space_separated() {
        assert_eq!(
            parse_timestamp("2019-06-15 21:30:00"),
            Some(at(2019, 6, 15, 21, 30, 0))
        );
    }

    #[test]
    fn parses_t_separated_with_fraction() {
        assert_eq!(
            parse_timestamp("2019-06-15T21:30:00.000"),
            Some(at(2019, 6, 15, 21, 30, 0))
        );
    }

    #[test]
    fn parses_short_offset_keeping_wall_clock() {
        assert_eq!(
            parse_timestamp("2022-01-01 05:00:00+00"),
            Some(at(2022, 1, 1, 5, 0, 0))
        );
        assert_eq!(
            parse_timestamp("2022-01-01T05:00:00-05:00"),
            Some(at(2022, 1, 1, 5, 0, 0))
        );
    }

    #[test]
    fn parses_bare_date() {
        assert_eq!(parse_timestamp("2019-06-15"), Some(at(2019, 6, 15, 0, 0, 0)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp("06/15/2019 9:30 PM"), None);
        assert_eq!(parse_timestamp("not-a-date"), None);
    }

    #[test]
    fn midnight_rejects_impossible_days() {
        assert_eq!(midnight(2019, 6, 1), Some(at(2019, 6, 1, 0, 0, 0)));
        assert_eq!(midnight(2019, 2, 30), None);
    }
}
