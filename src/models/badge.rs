// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Badge definitions and award records.

use serde::{Deserialize, Serialize};

/// Badge family, used for grouping and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeType {
    Streak,
    Milestone,
    Special,
    Category,
}

impl BadgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeType::Streak => "streak",
            BadgeType::Milestone => "milestone",
            BadgeType::Special => "special",
            BadgeType::Category => "category",
        }
    }
}

/// What must be true of a user's facts for a badge to be earned.
///
/// Closed enum: adding a kind without updating the evaluator is a
/// compile-time error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    ActionsCount,
    StreakDays,
    GroupJoin,
    CategoryCount,
    SpecialEvent,
}

/// A catalog badge definition. Immutable once seeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Badge {
    /// Stable slug ("streak_7", "category_transport", ...)
    pub id: String,
    pub name: String,
    pub description: String,
    /// Display icon (emoji)
    pub icon: String,
    pub badge_type: BadgeType,
    pub requirement_kind: RequirementKind,
    /// Threshold; meaning depends on `requirement_kind`
    pub requirement: u32,
    /// Which activity category is counted; only set for category badges
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Reward points granted on award
    pub points: u32,
}

/// Award record stored in Firestore.
///
/// Document ID is `{user_id}_{badge_id}`, so the store enforces the
/// at-most-once constraint per (user, badge) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBadgeAward {
    pub user_id: String,
    pub badge_id: String,
    /// Timestamp of first satisfaction (ISO 8601)
    pub earned_at: String,
}
