//! Per-user fact aggregates for badge evaluation and dashboard queries.
//!
//! These aggregates are pre-computed when actions are processed, reducing
//! badge evaluation and dashboard Firestore reads from O(actions) to O(1).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::Activity;

/// Pre-computed facts for a user.
///
/// Stored in `user_facts`, keyed by user ID. Updated atomically with
/// activity writes via Firestore transactions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserFacts {
    // ─── Action Stats ────────────────────────────────────────────
    /// Total actions logged
    #[serde(default)]
    pub total_actions: u32,
    /// Action count per category
    #[serde(default)]
    pub actions_by_category: HashMap<String, u32>,
    /// Action count per month ("YYYY-MM" format)
    #[serde(default)]
    pub actions_by_month: HashMap<String, u32>,

    // ─── Social Stats ────────────────────────────────────────────
    /// Number of groups the user belongs to
    #[serde(default)]
    pub groups_joined: u32,

    // ─── Metadata ────────────────────────────────────────────────
    /// Last update timestamp (ISO 8601)
    #[serde(default)]
    pub updated_at: String,
}

impl UserFacts {
    /// Update facts with a newly logged action.
    pub fn update_from_activity(&mut self, activity: &Activity, now: &str) {
        self.total_actions += 1;

        *self
            .actions_by_category
            .entry(activity.category.clone())
            .or_insert(0) += 1;

        let month_key = activity.occurred_on.format("%Y-%m").to_string();
        *self.actions_by_month.entry(month_key).or_insert(0) += 1;

        self.updated_at = now.to_string();
    }

    /// Record a new group membership.
    pub fn record_group_join(&mut self, now: &str) {
        self.groups_joined += 1;
        self.updated_at = now.to_string();
    }

    /// Action count for one category.
    pub fn category_count(&self, category: &str) -> u32 {
        self.actions_by_category.get(category).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_activity(id: &str, category: &str, date: NaiveDate) -> Activity {
        Activity {
            activity_id: id.to_string(),
            user_id: "u1".to_string(),
            title: format!("Test Action {}", id),
            category: category.to_string(),
            occurred_on: date,
            description: None,
            source: "test".to_string(),
            processed_at: "2024-01-15T12:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_update_from_activity_basic() {
        let mut facts = UserFacts::default();
        let activity = make_activity(
            "a1",
            "transport",
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        );

        facts.update_from_activity(&activity, "2024-01-15T12:00:00Z");

        assert_eq!(facts.total_actions, 1);
        assert_eq!(facts.category_count("transport"), 1);
        assert_eq!(facts.actions_by_month.get("2024-01"), Some(&1));
        assert_eq!(facts.updated_at, "2024-01-15T12:00:00Z");
    }

    #[test]
    fn test_categories_accumulate_independently() {
        let mut facts = UserFacts::default();
        let jan = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        facts.update_from_activity(&make_activity("a1", "transport", jan), "now");
        facts.update_from_activity(&make_activity("a2", "energy", jan), "now");
        facts.update_from_activity(&make_activity("a3", "transport", jan), "now");

        assert_eq!(facts.total_actions, 3);
        assert_eq!(facts.category_count("transport"), 2);
        assert_eq!(facts.category_count("energy"), 1);
        assert_eq!(facts.category_count("waste"), 0);
    }

    #[test]
    fn test_group_join_bumps_count() {
        let mut facts = UserFacts::default();

        facts.record_group_join("2024-01-15T12:00:00Z");
        facts.record_group_join("2024-01-16T12:00:00Z");

        assert_eq!(facts.groups_joined, 2);
        assert_eq!(facts.total_actions, 0);
    }
}
