//! Daily streak bookkeeping.
//!
//! A streak is a run of consecutive calendar days with recorded activity.
//! The check runs once per session activation against the wall-clock date;
//! it never backfills missed days.

use chrono::NaiveDate;

use crate::types::UserProfile;

/// What the daily check decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// Already checked in today
    SameDay,
    /// Exactly one day after the last activity: the streak continues
    Continued,
    /// First-ever activity, or a gap of two or more days
    Reset,
}

impl StreakChange {
    /// Whether this change earns the streak bonus XP.
    pub fn earns_bonus(&self) -> bool {
        matches!(self, StreakChange::Continued)
    }
}

/// Classify `today` against the last recorded active day.
pub fn evaluate(last_active: Option<NaiveDate>, today: NaiveDate) -> StreakChange {
    match last_active {
        Some(last) if last == today => StreakChange::SameDay,
        Some(last) if last.succ_opt() == Some(today) => StreakChange::Continued,
        _ => StreakChange::Reset,
    }
}

/// Apply the daily check to a profile, returning the updated profile and the
/// decision. XP for a continued streak is the caller's to award so that the
/// level-up signal is emitted in one place.
pub fn check_daily_streak(profile: &UserProfile, today: NaiveDate) -> (UserProfile, StreakChange) {
    let change = evaluate(profile.last_active, today);
    let mut updated = profile.clone();

    match change {
        StreakChange::SameDay => {}
        StreakChange::Continued => {
            updated.streak += 1;
            updated.last_active = Some(today);
        }
        StreakChange::Reset => {
            updated.streak = 1;
            updated.last_active = Some(today);
        }
    }

    (updated, change)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_same_day_is_noop() {
        let profile = UserProfile {
            streak: 4,
            last_active: Some(day("2025-03-10")),
            ..Default::default()
        };
        let (updated, change) = check_daily_streak(&profile, day("2025-03-10"));
        assert_eq!(change, StreakChange::SameDay);
        assert!(!change.earns_bonus());
        assert_eq!(updated, profile);
    }

    #[test]
    fn test_consecutive_day_continues() {
        let profile = UserProfile {
            streak: 4,
            last_active: Some(day("2025-03-10")),
            ..Default::default()
        };
        let (updated, change) = check_daily_streak(&profile, day("2025-03-11"));
        assert_eq!(change, StreakChange::Continued);
        assert!(change.earns_bonus());
        assert_eq!(updated.streak, 5);
        assert_eq!(updated.last_active, Some(day("2025-03-11")));
    }

    #[test]
    fn test_gap_resets_without_bonus() {
        let profile = UserProfile {
            streak: 4,
            last_active: Some(day("2025-03-10")),
            ..Default::default()
        };
        let (updated, change) = check_daily_streak(&profile, day("2025-03-13"));
        assert_eq!(change, StreakChange::Reset);
        assert!(!change.earns_bonus());
        assert_eq!(updated.streak, 1);
        assert_eq!(updated.last_active, Some(day("2025-03-13")));
    }

    #[test]
    fn test_first_activity_starts_at_one() {
        let profile = UserProfile::default();
        let (updated, change) = check_daily_streak(&profile, day("2025-03-10"));
        assert_eq!(change, StreakChange::Reset);
        assert_eq!(updated.streak, 1);
    }

    #[test]
    fn test_month_boundary_counts_as_consecutive() {
        let profile = UserProfile {
            streak: 9,
            last_active: Some(day("2025-02-28")),
            ..Default::default()
        };
        let (updated, change) = check_daily_streak(&profile, day("2025-03-01"));
        assert_eq!(change, StreakChange::Continued);
        assert_eq!(updated.streak, 10);
    }
}
