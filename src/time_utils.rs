// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting and day-boundary arithmetic.

use chrono::{DateTime, Datelike, SecondsFormat, TimeZone, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Number of whole calendar days between two instants, after normalizing
/// both to UTC midnight.
///
/// Positive when `later` is on a later calendar day. Both the stored streak
/// update and the read-only display decay go through this function so the two
/// interpretations of "gap" cannot drift apart.
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    (utc_midnight(later) - utc_midnight(earlier)).num_days()
}

/// Truncate a timestamp to 00:00:00 UTC on the same calendar day.
fn utc_midnight(date: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(date.year(), date.month(), date.day(), 0, 0, 0)
        .single()
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_same_calendar_day_is_zero() {
        // 23:59 and 00:01 on the same UTC day
        assert_eq!(
            days_between(dt("2024-03-10T00:01:00Z"), dt("2024-03-10T23:59:00Z")),
            0
        );
    }

    #[test]
    fn test_adjacent_days_is_one_regardless_of_hours() {
        // Less than 24h apart on the clock but on adjacent calendar days
        assert_eq!(
            days_between(dt("2024-03-10T23:00:00Z"), dt("2024-03-11T01:00:00Z")),
            1
        );
    }

    #[test]
    fn test_multi_day_gap() {
        assert_eq!(
            days_between(dt("2024-03-10T10:00:00Z"), dt("2024-03-14T10:00:00Z")),
            4
        );
    }

    #[test]
    fn test_negative_when_reversed() {
        assert_eq!(
            days_between(dt("2024-03-11T00:00:00Z"), dt("2024-03-10T00:00:00Z")),
            -1
        );
    }
}
