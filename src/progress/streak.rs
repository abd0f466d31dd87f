//! Streak computation
//!
//! A streak is a run of consecutive calendar days with at least one
//! tracked study action. The walk starts at today, or at yesterday when
//! today has no entry yet: a visit before the day's first study action
//! must not break a streak that is still inside the one-day grace
//! window.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

/// Count consecutive study days ending at `today` (or at yesterday,
/// within the grace window). Returns 0 when the most recent study day is
/// more than one day before today.
pub fn current_streak(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    if dates.is_empty() {
        return 0;
    }

    let mut cursor = today;
    if !dates.contains(&cursor) {
        cursor = cursor - Duration::days(1);
        if !dates.contains(&cursor) {
            return 0;
        }
    }

    let mut streak = 0u32;
    while dates.contains(&cursor) {
        streak += 1;
        cursor = cursor - Duration::days(1);
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn dates(days: &[u32]) -> BTreeSet<NaiveDate> {
        days.iter().map(|d| day(*d)).collect()
    }

    #[test]
    fn test_empty_set_has_no_streak() {
        assert_eq!(current_streak(&dates(&[]), day(10)), 0);
    }

    #[test]
    fn test_three_consecutive_days_ending_today() {
        assert_eq!(current_streak(&dates(&[8, 9, 10]), day(10)), 3);
    }

    #[test]
    fn test_single_stale_day_is_broken() {
        // Last activity five days ago, no grace
        assert_eq!(current_streak(&dates(&[5]), day(10)), 0);
    }

    #[test]
    fn test_two_day_gap_is_broken() {
        assert_eq!(current_streak(&dates(&[8]), day(10)), 0);
    }

    #[test]
    fn test_yesterday_only_keeps_streak_alive() {
        // Visited today, no study action yet
        assert_eq!(current_streak(&dates(&[9]), day(10)), 1);
    }

    #[test]
    fn test_grace_window_counts_run_ending_yesterday() {
        // Streak includes yesterday but not today; older days stay counted
        assert_eq!(current_streak(&dates(&[7, 8, 9]), day(10)), 3);
    }

    #[test]
    fn test_walk_stops_at_first_gap() {
        // 10, 9 consecutive; 7 is past the gap at 8
        assert_eq!(current_streak(&dates(&[7, 9, 10]), day(10)), 2);
    }

    #[test]
    fn test_today_only() {
        assert_eq!(current_streak(&dates(&[10]), day(10)), 1);
    }
}
