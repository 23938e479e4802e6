// SPDX-License-Identifier: MIT

//! Streak behavior over multi-day ride sequences.
//!
//! The in-module unit tests cover each transition in isolation; these walk
//! longer sequences the way a real user would produce them.

use chrono::{DateTime, Duration, Utc};
use pedalpath::services::streak::{display_streak, update_streak};

fn dt(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

#[test]
fn test_week_of_daily_rides() {
    let mut last: Option<DateTime<Utc>> = None;
    let mut current = 0;
    let mut longest = 0;

    let start = dt("2024-06-01T07:30:00Z");
    for day in 0..7 {
        let now = start + Duration::days(day);
        let update = update_streak(last, current, longest, now);
        last = Some(update.last_ride_date);
        current = update.current_streak;
        longest = update.longest_streak;
    }

    assert_eq!(current, 7);
    assert_eq!(longest, 7);
}

#[test]
fn test_two_rides_per_day_count_once() {
    let morning = dt("2024-06-01T07:30:00Z");
    let evening = dt("2024-06-01T18:00:00Z");

    let first = update_streak(None, 0, 0, morning);
    let second = update_streak(
        Some(first.last_ride_date),
        first.current_streak,
        first.longest_streak,
        evening,
    );

    assert_eq!(second.current_streak, 1);
    // Anchor stays on the morning ride
    assert_eq!(second.last_ride_date, morning);

    // The next morning still counts as consecutive
    let next = update_streak(
        Some(second.last_ride_date),
        second.current_streak,
        second.longest_streak,
        dt("2024-06-02T08:00:00Z"),
    );
    assert_eq!(next.current_streak, 2);
}

#[test]
fn test_streak_rebuilds_after_break() {
    // 5-day streak, 3-day break, then 2 more days
    let mut last = None;
    let mut current = 0;
    let mut longest = 0;

    let ride = |now: DateTime<Utc>, last: &mut Option<DateTime<Utc>>, current: &mut u32, longest: &mut u32| {
        let update = update_streak(*last, *current, *longest, now);
        *last = Some(update.last_ride_date);
        *current = update.current_streak;
        *longest = update.longest_streak;
    };

    let start = dt("2024-06-01T09:00:00Z");
    for day in 0..5 {
        ride(start + Duration::days(day), &mut last, &mut current, &mut longest);
    }
    assert_eq!((current, longest), (5, 5));

    for day in 8..10 {
        ride(start + Duration::days(day), &mut last, &mut current, &mut longest);
    }
    assert_eq!(current, 2);
    assert_eq!(longest, 5, "a break never reduces the longest streak");
}

#[test]
fn test_display_decay_does_not_touch_stored_state() {
    let last = dt("2024-06-01T09:00:00Z");
    let stored_current = 6;

    // Four days later the displayed streak is 0...
    assert_eq!(
        display_streak(Some(last), stored_current, dt("2024-06-05T09:00:00Z")),
        0
    );

    // ...but a ride that day still goes through the stored-update rules,
    // which see the same gap and reset from the stored value.
    let update = update_streak(Some(last), stored_current, 8, dt("2024-06-05T09:00:00Z"));
    assert_eq!(update.current_streak, 1);
    assert_eq!(update.longest_streak, 8);
}
