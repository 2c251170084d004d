// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streak engine.
//!
//! Wraps the pure transition logic in [`crate::models::streak`] with the
//! transactional persistence it needs: recording an action is one atomic
//! read-modify-write against the user's streak and fact documents, and the
//! scheduled sweep is the only path that zeroes a streak.

use chrono::NaiveDate;
use futures_util::{stream, StreamExt};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::{Activity, UserStreak};

const MAX_CONCURRENT_RESETS: usize = 20;

/// User-facing streak payload.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StreakInfo {
    pub current_streak: u32,
    /// ISO date string, or null if the user never logged an action
    pub last_action_date: Option<String>,
    pub is_active: bool,
}

/// Expiry warning payload shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StreakWarning {
    pub warning: bool,
    #[serde(rename = "daysRemaining")]
    pub days_remaining: u32,
}

/// Result of one sweep run.
#[derive(Debug, Default)]
pub struct SweepOutcome {
    /// Stale streak documents examined
    pub scanned: usize,
    /// Streaks actually reset to 0
    pub reset: usize,
    /// Per-user reset failures (retried on the next scheduled run)
    pub failed: usize,
}

/// Maintains per-user streak state.
pub struct StreakEngine {
    db: FirestoreDb,
    grace_days: u32,
}

impl StreakEngine {
    pub fn new(db: FirestoreDb, grace_days: u32) -> Self {
        Self { db, grace_days }
    }

    /// Record one logged action and return the streak value after it.
    ///
    /// Same-day repeats are idempotent. Fails with a not-found error if the
    /// user does not exist; that failure is visible to the caller since the
    /// streak is a user-facing guarantee.
    pub async fn record_activity(&self, activity: &Activity) -> Result<u32> {
        self.db
            .record_activity_atomic(activity, self.grace_days)
            .await
    }

    /// Current streak state as of `today`. Pure read, no side effects.
    pub async fn streak_info(&self, user_id: &str, today: NaiveDate) -> Result<StreakInfo> {
        let streak = self
            .db
            .get_streak(user_id)
            .await?
            .unwrap_or_else(|| UserStreak::new(user_id));

        Ok(StreakInfo {
            current_streak: streak.current_streak,
            last_action_date: streak.last_action_date.map(|d| d.to_string()),
            is_active: streak.is_active(today, self.grace_days),
        })
    }

    /// Expiry warning as of `today`. Pure read, no side effects.
    pub async fn streak_warning(&self, user_id: &str, today: NaiveDate) -> Result<StreakWarning> {
        let streak = self
            .db
            .get_streak(user_id)
            .await?
            .unwrap_or_else(|| UserStreak::new(user_id));

        Ok(StreakWarning {
            warning: streak.warning(today, self.grace_days),
            days_remaining: streak.days_remaining(today, self.grace_days),
        })
    }

    /// Reset every expired streak to 0.
    ///
    /// Invoked daily by the external scheduler for users who stopped logging
    /// and would otherwise keep a stale non-zero streak forever. Each reset
    /// re-checks expiry inside its own transaction, so users who come back
    /// mid-sweep are left alone.
    pub async fn sweep_expired(&self, today: NaiveDate) -> Result<SweepOutcome> {
        let cutoff = today - chrono::Duration::days(self.grace_days as i64);
        let stale = self.db.get_streaks_older_than(cutoff).await?;

        let candidates: Vec<UserStreak> = stale
            .into_iter()
            .filter(|s| s.is_expired(today, self.grace_days))
            .collect();

        let mut outcome = SweepOutcome {
            scanned: candidates.len(),
            ..SweepOutcome::default()
        };

        let grace_days = self.grace_days;
        let db = &self.db;

        let results = stream::iter(candidates)
            .map(|streak| async move {
                db.reset_streak_if_expired(&streak.user_id, today, grace_days)
                    .await
                    .map_err(|e| (streak.user_id.clone(), e))
            })
            .buffer_unordered(MAX_CONCURRENT_RESETS)
            .collect::<Vec<_>>()
            .await;

        for result in results {
            match result {
                Ok(true) => outcome.reset += 1,
                Ok(false) => {}
                Err((user_id, e)) => {
                    tracing::warn!(user_id = %user_id, error = %e, "Streak reset failed");
                    outcome.failed += 1;
                }
            }
        }

        tracing::info!(
            scanned = outcome.scanned,
            reset = outcome.reset,
            failed = outcome.failed,
            "Streak sweep complete"
        );

        Ok(outcome)
    }
}
