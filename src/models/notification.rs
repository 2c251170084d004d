// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User notification model.

use serde::{Deserialize, Serialize};

use crate::models::Badge;

/// Notification title used for badge awards.
pub const BADGE_EARNED_TITLE: &str = "Badge earned!";

/// A user-facing notification stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Server-generated UUID (also used as document ID)
    pub id: String,
    pub user_id: String,
    /// Notification kind ("badge_earned", ...)
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    /// Back-reference to the awarded badge, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_id: Option<String>,
    pub is_read: bool,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
}

impl Notification {
    /// Notification accompanying a badge award.
    pub fn badge_earned(user_id: &str, badge: &Badge, now: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind: "badge_earned".to_string(),
            title: BADGE_EARNED_TITLE.to_string(),
            message: format!(
                "You earned the \"{}\" badge (+{} points)",
                badge.name, badge.points
            ),
            badge_id: Some(badge.id.clone()),
            is_read: false,
            created_at: now.to_string(),
        }
    }
}
