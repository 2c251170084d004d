// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user streak state and its date-arithmetic transitions.
//!
//! A streak counts consecutive qualifying days with a grace window: a gap
//! of up to `grace_days` between logged actions keeps the streak alive.
//! Breaking the window restarts the streak at 1 (the day just logged).
//! The only path to 0 after any activity is the scheduled sweep, which
//! handles users who never come back to trigger the lazy update.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Streak document stored in Firestore, keyed by user ID.
///
/// Invariant: `current_streak == 0` iff `last_action_date` is absent,
/// except after a sweep reset (streak 0, date kept for history).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStreak {
    pub user_id: String,
    /// Count of consecutive qualifying days
    pub current_streak: u32,
    /// Date of the most recent logged action (ISO `YYYY-MM-DD`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_action_date: Option<NaiveDate>,
    /// Last update timestamp (ISO 8601)
    #[serde(default)]
    pub updated_at: String,
}

impl UserStreak {
    /// Zero state for a user who has never logged an action.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            current_streak: 0,
            last_action_date: None,
            updated_at: String::new(),
        }
    }

    /// Apply one logged action dated `occurred_on`.
    ///
    /// Returns the streak value after the update. Repeated calls with the
    /// same date are idempotent; backdated entries never move the streak
    /// or the last-action date.
    pub fn apply_action(&mut self, occurred_on: NaiveDate, grace_days: u32, now: &str) -> u32 {
        match self.last_action_date {
            None => {
                self.current_streak = 1;
            }
            Some(last) if occurred_on <= last => {
                // Same-day repeat or backdated entry: streak unchanged.
                return self.current_streak;
            }
            Some(last) => {
                let gap = occurred_on.signed_duration_since(last).num_days();
                if gap <= grace_days as i64 {
                    self.current_streak += 1;
                } else {
                    // Streak broken: restart at 1 for the day just logged.
                    self.current_streak = 1;
                }
            }
        }

        self.last_action_date = Some(occurred_on);
        self.updated_at = now.to_string();
        self.current_streak
    }

    /// Whether the streak is still alive as of `today`.
    pub fn is_active(&self, today: NaiveDate, grace_days: u32) -> bool {
        match self.last_action_date {
            None => false,
            Some(last) => today.signed_duration_since(last).num_days() <= grace_days as i64,
        }
    }

    /// Days left before the grace window closes: `max(0, grace - (today - last))`.
    pub fn days_remaining(&self, today: NaiveDate, grace_days: u32) -> u32 {
        match self.last_action_date {
            None => 0,
            Some(last) => {
                let gap = today.signed_duration_since(last).num_days().max(0);
                (grace_days as i64 - gap).max(0) as u32
            }
        }
    }

    /// Whether the user should be warned their streak is about to expire.
    pub fn warning(&self, today: NaiveDate, grace_days: u32) -> bool {
        let remaining = self.days_remaining(today, grace_days);
        remaining > 0 && remaining <= 1
    }

    /// Whether a sweep run on `today` should reset this streak to 0.
    pub fn is_expired(&self, today: NaiveDate, grace_days: u32) -> bool {
        self.current_streak > 0 && !self.is_active(today, grace_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRACE: u32 = 3;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn streak_at(current: u32, last: NaiveDate) -> UserStreak {
        UserStreak {
            user_id: "u1".to_string(),
            current_streak: current,
            last_action_date: Some(last),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_cold_start_sets_streak_to_one() {
        let mut streak = UserStreak::new("u1");
        let d = date(2024, 1, 15);

        assert_eq!(streak.apply_action(d, GRACE, "now"), 1);
        assert_eq!(streak.last_action_date, Some(d));
    }

    #[test]
    fn test_same_day_is_idempotent() {
        let mut streak = streak_at(5, date(2024, 1, 10));

        assert_eq!(streak.apply_action(date(2024, 1, 10), GRACE, "now"), 5);
        assert_eq!(streak.apply_action(date(2024, 1, 10), GRACE, "now"), 5);
        assert_eq!(streak.last_action_date, Some(date(2024, 1, 10)));
    }

    #[test]
    fn test_consecutive_day_increments() {
        let mut streak = streak_at(5, date(2024, 1, 10));

        assert_eq!(streak.apply_action(date(2024, 1, 11), GRACE, "now"), 6);
        assert_eq!(streak.last_action_date, Some(date(2024, 1, 11)));
    }

    #[test]
    fn test_gap_inside_grace_window_increments() {
        // gap = 3 is still within the default window
        let mut streak = streak_at(5, date(2024, 1, 10));

        assert_eq!(streak.apply_action(date(2024, 1, 13), GRACE, "now"), 6);
    }

    #[test]
    fn test_gap_past_grace_window_restarts_at_one() {
        let mut streak = streak_at(5, date(2024, 1, 10));

        assert_eq!(streak.apply_action(date(2024, 1, 14), GRACE, "now"), 1);
        assert_eq!(streak.last_action_date, Some(date(2024, 1, 14)));
    }

    #[test]
    fn test_backdated_entry_leaves_streak_alone() {
        let mut streak = streak_at(5, date(2024, 1, 10));

        assert_eq!(streak.apply_action(date(2024, 1, 2), GRACE, "now"), 5);
        assert_eq!(streak.last_action_date, Some(date(2024, 1, 10)));
    }

    #[test]
    fn test_is_active_within_grace() {
        let streak = streak_at(5, date(2024, 1, 10));

        assert!(streak.is_active(date(2024, 1, 13), GRACE));
        assert!(!streak.is_active(date(2024, 1, 14), GRACE));
    }

    #[test]
    fn test_is_active_without_history() {
        let streak = UserStreak::new("u1");
        assert!(!streak.is_active(date(2024, 1, 13), GRACE));
    }

    #[test]
    fn test_days_remaining_counts_down() {
        let streak = streak_at(5, date(2024, 1, 10));

        assert_eq!(streak.days_remaining(date(2024, 1, 10), GRACE), 3);
        assert_eq!(streak.days_remaining(date(2024, 1, 12), GRACE), 1);
        assert_eq!(streak.days_remaining(date(2024, 1, 13), GRACE), 0);
        assert_eq!(streak.days_remaining(date(2024, 1, 20), GRACE), 0);
    }

    #[test]
    fn test_warning_fires_on_last_day_only() {
        let streak = streak_at(5, date(2024, 1, 10));

        assert!(!streak.warning(date(2024, 1, 10), GRACE));
        assert!(!streak.warning(date(2024, 1, 11), GRACE));
        assert!(streak.warning(date(2024, 1, 12), GRACE));
        assert!(!streak.warning(date(2024, 1, 13), GRACE));
    }

    #[test]
    fn test_warning_without_history() {
        let streak = UserStreak::new("u1");
        assert!(!streak.warning(date(2024, 1, 12), GRACE));
        assert_eq!(streak.days_remaining(date(2024, 1, 12), GRACE), 0);
    }

    #[test]
    fn test_is_expired_needs_nonzero_streak_and_stale_date() {
        let stale = streak_at(5, date(2024, 1, 10));
        assert!(stale.is_expired(date(2024, 1, 20), GRACE));
        assert!(!stale.is_expired(date(2024, 1, 13), GRACE));

        // Post-sweep state: streak already 0, date kept
        let swept = streak_at(0, date(2024, 1, 10));
        assert!(!swept.is_expired(date(2024, 1, 20), GRACE));
    }

    #[test]
    fn test_custom_grace_window() {
        // grace = 1 approximates a strict daily cadence
        let mut streak = streak_at(5, date(2024, 1, 10));
        assert_eq!(streak.apply_action(date(2024, 1, 12), 1, "now"), 1);

        let mut streak = streak_at(5, date(2024, 1, 10));
        assert_eq!(streak.apply_action(date(2024, 1, 11), 1, "now"), 6);
    }
}
