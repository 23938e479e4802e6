// SPDX-License-Identifier: MIT

//! Consecutive-day ride streak arithmetic.
//!
//! Pure functions over UTC-midnight day boundaries; the caller supplies
//! "now" so the logic is deterministic under test. Both the stored update and
//! the read-only display decay share `time_utils::days_between`.

use chrono::{DateTime, Utc};

use crate::time_utils::days_between;

/// Streak state after applying a completed ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Anchor for the next day-difference; NOT advanced for same-day rides.
    pub last_ride_date: DateTime<Utc>,
}

/// Compute the streak state after a ride completed at `now`.
///
/// - first ride ever: streak starts at 1
/// - same calendar day: unchanged, anchor stays on the original date
/// - consecutive day: current + 1, longest raised if surpassed
/// - gap of more than one day: current resets to 1, longest preserved
pub fn update_streak(
    last_ride_date: Option<DateTime<Utc>>,
    current_streak: u32,
    longest_streak: u32,
    now: DateTime<Utc>,
) -> StreakUpdate {
    let Some(last) = last_ride_date else {
        return StreakUpdate {
            current_streak: 1,
            longest_streak: longest_streak.max(1),
            last_ride_date: now,
        };
    };

    match days_between(last, now) {
        0 => StreakUpdate {
            current_streak,
            longest_streak,
            last_ride_date: last,
        },
        1 => {
            let current = current_streak + 1;
            StreakUpdate {
                current_streak: current,
                longest_streak: longest_streak.max(current),
                last_ride_date: now,
            }
        }
        _ => StreakUpdate {
            current_streak: 1,
            longest_streak,
            last_ride_date: now,
        },
    }
}

/// Streak to show on read-only stat displays.
///
/// A stored streak only changes when a ride completes, so a user who stopped
/// riding still has their old `current_streak` on record. For display we zero
/// it once more than one day has elapsed, without mutating stored state.
pub fn display_streak(
    last_ride_date: Option<DateTime<Utc>>,
    current_streak: u32,
    now: DateTime<Utc>,
) -> u32 {
    match last_ride_date {
        Some(last) if days_between(last, now) <= 1 => current_streak,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_first_ride_starts_streak() {
        let now = dt("2024-05-01T09:00:00Z");
        let update = update_streak(None, 0, 0, now);
        assert_eq!(update.current_streak, 1);
        assert_eq!(update.longest_streak, 1);
        assert_eq!(update.last_ride_date, now);
    }

    #[test]
    fn test_first_ride_keeps_existing_longest() {
        // Longest can predate a data reset of current; never reduce it.
        let update = update_streak(None, 0, 9, dt("2024-05-01T09:00:00Z"));
        assert_eq!(update.current_streak, 1);
        assert_eq!(update.longest_streak, 9);
    }

    #[test]
    fn test_same_day_is_noop_and_keeps_anchor() {
        let last = dt("2024-05-01T06:00:00Z");
        let now = dt("2024-05-01T21:30:00Z");
        let update = update_streak(Some(last), 4, 7, now);
        assert_eq!(update.current_streak, 4);
        assert_eq!(update.longest_streak, 7);
        // Anchor must not advance within the same day
        assert_eq!(update.last_ride_date, last);
    }

    #[test]
    fn test_consecutive_day_increments() {
        let update = update_streak(
            Some(dt("2024-05-01T22:00:00Z")),
            3,
            5,
            dt("2024-05-02T07:00:00Z"),
        );
        assert_eq!(update.current_streak, 4);
        assert_eq!(update.longest_streak, 5);
        assert_eq!(update.last_ride_date, dt("2024-05-02T07:00:00Z"));
    }

    #[test]
    fn test_consecutive_day_raises_longest() {
        let update = update_streak(
            Some(dt("2024-05-01T08:00:00Z")),
            5,
            5,
            dt("2024-05-02T08:00:00Z"),
        );
        assert_eq!(update.current_streak, 6);
        assert_eq!(update.longest_streak, 6);
    }

    #[test]
    fn test_gap_resets_current_preserves_longest() {
        let update = update_streak(
            Some(dt("2024-04-28T08:00:00Z")),
            7,
            10,
            dt("2024-05-01T08:00:00Z"),
        );
        assert_eq!(update.current_streak, 1);
        assert_eq!(update.longest_streak, 10);
        assert_eq!(update.last_ride_date, dt("2024-05-01T08:00:00Z"));
    }

    #[test]
    fn test_display_streak_shows_current_within_one_day() {
        let now = dt("2024-05-02T08:00:00Z");
        assert_eq!(display_streak(Some(dt("2024-05-02T06:00:00Z")), 4, now), 4);
        assert_eq!(display_streak(Some(dt("2024-05-01T23:00:00Z")), 4, now), 4);
    }

    #[test]
    fn test_display_streak_decays_after_gap() {
        let now = dt("2024-05-04T08:00:00Z");
        assert_eq!(display_streak(Some(dt("2024-05-01T08:00:00Z")), 4, now), 0);
        assert_eq!(display_streak(None, 0, now), 0);
    }
}
