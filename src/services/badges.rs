// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Badge award engine.
//!
//! Re-evaluates the full catalog against a user's current facts and awards
//! newly satisfied badges. The award itself is an insert-if-absent on the
//! `(user_id, badge_id)` document, so concurrent evaluations of the same
//! user converge on exactly one award and one notification per badge.
//!
//! This engine is invoked best-effort after state-changing user actions;
//! callers catch and log its errors rather than failing the parent action.

use std::collections::{HashMap, HashSet};

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::badge::{Badge, RequirementKind};
use crate::models::{UserFacts, UserStreak};
use crate::services::catalog::BadgeCatalog;

/// Snapshot of the facts badge rules are evaluated against.
#[derive(Debug, Clone, Default)]
pub struct UserFactsView {
    pub current_streak: u32,
    pub total_actions: u32,
    pub groups_joined: u32,
    pub actions_by_category: HashMap<String, u32>,
}

impl UserFactsView {
    pub fn assemble(streak: &UserStreak, facts: &UserFacts) -> Self {
        Self {
            current_streak: streak.current_streak,
            total_actions: facts.total_actions,
            groups_joined: facts.groups_joined,
            actions_by_category: facts.actions_by_category.clone(),
        }
    }

    fn category_count(&self, category: &str) -> u32 {
        self.actions_by_category.get(category).copied().unwrap_or(0)
    }
}

/// Whether a badge's requirement is satisfied by the given facts.
pub fn satisfies(badge: &Badge, facts: &UserFactsView) -> bool {
    match badge.requirement_kind {
        RequirementKind::ActionsCount => facts.total_actions >= badge.requirement,
        RequirementKind::StreakDays => facts.current_streak >= badge.requirement,
        RequirementKind::GroupJoin => facts.groups_joined >= badge.requirement,
        RequirementKind::CategoryCount => match badge.category.as_deref() {
            Some(category) => facts.category_count(category) >= badge.requirement,
            // A category badge with no category can never be earned
            None => false,
        },
        // Awarded manually or by future event-driven flows
        RequirementKind::SpecialEvent => false,
    }
}

/// Evaluates catalog rules and issues at-most-once awards.
pub struct BadgeAwardEngine {
    db: FirestoreDb,
    catalog: BadgeCatalog,
}

impl BadgeAwardEngine {
    pub fn new(db: FirestoreDb, catalog: BadgeCatalog) -> Self {
        Self { db, catalog }
    }

    /// Check every catalog badge and award the newly satisfied ones.
    ///
    /// Returns the badges awarded by *this* call: an award that loses the
    /// race to a concurrent evaluation is not reported again. A failed award
    /// write is logged and skipped; the badge is retried on the next
    /// triggering event.
    pub async fn check_and_award(&self, user_id: &str) -> Result<Vec<Badge>> {
        let awarded: HashSet<String> = self
            .db
            .get_awarded_badges(user_id)
            .await?
            .into_iter()
            .map(|a| a.badge_id)
            .collect();

        let streak = self
            .db
            .get_streak(user_id)
            .await?
            .unwrap_or_else(|| UserStreak::new(user_id));
        let facts = self.db.get_facts(user_id).await?.unwrap_or_default();
        let view = UserFactsView::assemble(&streak, &facts);

        let mut newly_awarded = Vec::new();

        for badge in self.catalog.badges() {
            if awarded.contains(&badge.id) {
                continue;
            }
            if !satisfies(badge, &view) {
                continue;
            }

            match self.db.award_badge_atomic(user_id, badge).await {
                Ok(true) => newly_awarded.push(badge.clone()),
                Ok(false) => {
                    tracing::debug!(
                        user_id = %user_id,
                        badge_id = %badge.id,
                        "Badge already held (concurrent award)"
                    );
                }
                Err(e) => {
                    // One badge's failure must not block the rest
                    tracing::warn!(
                        user_id = %user_id,
                        badge_id = %badge.id,
                        error = %e,
                        "Badge award failed, will retry on next check"
                    );
                }
            }
        }

        if !newly_awarded.is_empty() {
            tracing::info!(
                user_id = %user_id,
                count = newly_awarded.len(),
                "New badges awarded"
            );
        }

        Ok(newly_awarded)
    }
}
