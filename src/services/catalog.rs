// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Badge catalog construction and seeding.
//!
//! Badges are declarative reference data: each definition is produced from a
//! `(type, requirement)` pair by a per-type builder, then held in memory for
//! the lifetime of the process. Seeding failures abort startup; nothing here
//! can fail at request time.

use std::str::FromStr;

use crate::models::badge::{Badge, BadgeType, RequirementKind};

/// Catalog construction errors, surfaced at startup seed time.
#[derive(Debug, thiserror::Error)]
pub enum BadgeCatalogError {
    #[error("Badge requirement must be non-negative, got {0}")]
    InvalidRequirement(i64),

    #[error("Unknown badge type: {0}")]
    UnknownBadgeType(String),
}

impl FromStr for BadgeType {
    type Err = BadgeCatalogError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "streak" => Ok(BadgeType::Streak),
            "milestone" => Ok(BadgeType::Milestone),
            "special" => Ok(BadgeType::Special),
            "category" => Ok(BadgeType::Category),
            other => Err(BadgeCatalogError::UnknownBadgeType(other.to_string())),
        }
    }
}

/// Build a badge definition from its type and requirement threshold.
///
/// Rejects negative requirements. Category badges built through this entry
/// point carry no category and therefore never satisfy; use
/// [`build_category_badge`] to seed real category badges.
pub fn build_badge(badge_type: BadgeType, requirement: i64) -> Result<Badge, BadgeCatalogError> {
    if requirement < 0 {
        return Err(BadgeCatalogError::InvalidRequirement(requirement));
    }
    let requirement = requirement as u32;

    Ok(match badge_type {
        BadgeType::Streak => streak_badge(requirement),
        BadgeType::Milestone => milestone_badge(requirement),
        BadgeType::Special => special_badge(requirement),
        BadgeType::Category => category_badge(None),
    })
}

/// Build a category badge counting actions in `category`.
///
/// Category badges have a fixed threshold of 50 actions and a fixed reward
/// of 300 points.
pub fn build_category_badge(category: &str) -> Badge {
    category_badge(Some(category))
}

const CATEGORY_BADGE_REQUIREMENT: u32 = 50;
const CATEGORY_BADGE_POINTS: u32 = 300;
const SPECIAL_BADGE_DEFAULT_POINTS: u32 = 500;

fn streak_badge(requirement: u32) -> Badge {
    let (name, description, icon) = match requirement {
        3 => (
            "Three-Day Spark".to_string(),
            "Keep a streak alive for 3 days".to_string(),
            "✨",
        ),
        7 => (
            "One Week Strong".to_string(),
            "Keep a streak alive for a full week".to_string(),
            "🔥",
        ),
        14 => (
            "Two-Week Flame".to_string(),
            "Keep a streak alive for 14 days".to_string(),
            "🔥",
        ),
        30 => (
            "Monthly Momentum".to_string(),
            "Keep a streak alive for 30 days".to_string(),
            "🏆",
        ),
        100 => (
            "Century Streak".to_string(),
            "Keep a streak alive for 100 days".to_string(),
            "💯",
        ),
        n => (
            format!("{}-Day Streak", n),
            format!("Keep a streak alive for {} days", n),
            "🔥",
        ),
    };

    Badge {
        id: format!("streak_{}", requirement),
        name,
        description,
        icon: icon.to_string(),
        badge_type: BadgeType::Streak,
        requirement_kind: RequirementKind::StreakDays,
        requirement,
        category: None,
        points: requirement * 10,
    }
}

fn milestone_badge(requirement: u32) -> Badge {
    let (name, description, icon) = match requirement {
        1 => (
            "First Step".to_string(),
            "Log your first sustainable action".to_string(),
            "🌱",
        ),
        10 => (
            "Ten Strong".to_string(),
            "Log 10 sustainable actions".to_string(),
            "🌿",
        ),
        50 => (
            "Half Century".to_string(),
            "Log 50 sustainable actions".to_string(),
            "🌳",
        ),
        100 => (
            "Action Hero".to_string(),
            "Log 100 sustainable actions".to_string(),
            "🌍",
        ),
        250 => (
            "Planet Guardian".to_string(),
            "Log 250 sustainable actions".to_string(),
            "🛡️",
        ),
        n => (
            format!("{} Actions", n),
            format!("Log {} sustainable actions", n),
            "⭐",
        ),
    };

    Badge {
        id: format!("milestone_{}", requirement),
        name,
        description,
        icon: icon.to_string(),
        badge_type: BadgeType::Milestone,
        requirement_kind: RequirementKind::ActionsCount,
        requirement,
        category: None,
        // Milestone points are 1:1 with the action count
        points: requirement,
    }
}

/// Special badges are keyed by event ID and awarded manually or by future
/// event-driven flows; the evaluator never satisfies them automatically.
fn special_badge(event_id: u32) -> Badge {
    let (name, description, icon, points) = match event_id {
        1 => (
            "Earth Day Champion".to_string(),
            "Take part in an Earth Day challenge".to_string(),
            "🌍",
            500,
        ),
        2 => (
            "Community Cleanup".to_string(),
            "Take part in a community cleanup event".to_string(),
            "🧹",
            750,
        ),
        _ => (
            "Special Event".to_string(),
            "Take part in a special event".to_string(),
            "⭐",
            SPECIAL_BADGE_DEFAULT_POINTS,
        ),
    };

    Badge {
        id: format!("special_{}", event_id),
        name,
        description,
        icon: icon.to_string(),
        badge_type: BadgeType::Special,
        requirement_kind: RequirementKind::SpecialEvent,
        requirement: event_id,
        category: None,
        points,
    }
}

fn category_badge(category: Option<&str>) -> Badge {
    let (name, description, icon) = match category {
        Some("transport") => (
            "Green Commuter".to_string(),
            "Log 50 sustainable transport actions".to_string(),
            "🚲",
        ),
        Some("energy") => (
            "Energy Saver".to_string(),
            "Log 50 energy-saving actions".to_string(),
            "💡",
        ),
        Some("waste") => (
            "Waste Warrior".to_string(),
            "Log 50 waste-reduction actions".to_string(),
            "♻️",
        ),
        Some("food") => (
            "Conscious Eater".to_string(),
            "Log 50 sustainable food actions".to_string(),
            "🥦",
        ),
        Some(other) => (
            format!("{} Specialist", capitalize(other)),
            format!("Log 50 {} actions", other),
            "🌍",
        ),
        None => (
            "Category Specialist".to_string(),
            "Log 50 actions in one category".to_string(),
            "🌍",
        ),
    };

    Badge {
        id: match category {
            Some(c) => format!("category_{}", c),
            None => "category_generic".to_string(),
        },
        name,
        description,
        icon: icon.to_string(),
        badge_type: BadgeType::Category,
        requirement_kind: RequirementKind::CategoryCount,
        requirement: CATEGORY_BADGE_REQUIREMENT,
        category: category.map(String::from),
        points: CATEGORY_BADGE_POINTS,
    }
}

/// Group badges reuse the special family but count group memberships.
fn group_badge(requirement: u32) -> Badge {
    let (name, description, icon) = match requirement {
        1 => (
            "Team Player".to_string(),
            "Join your first group".to_string(),
            "🤝",
        ),
        3 => (
            "Community Builder".to_string(),
            "Belong to 3 groups".to_string(),
            "🌐",
        ),
        n => (
            format!("{} Groups", n),
            format!("Belong to {} groups", n),
            "🤝",
        ),
    };

    Badge {
        id: format!("group_{}", requirement),
        name,
        description,
        icon: icon.to_string(),
        badge_type: BadgeType::Special,
        requirement_kind: RequirementKind::GroupJoin,
        requirement,
        category: None,
        points: requirement * 100,
    }
}

/// In-memory badge catalog, seeded once at startup.
#[derive(Default, Clone)]
pub struct BadgeCatalog {
    badges: Vec<Badge>,
}

impl BadgeCatalog {
    /// Seed the default catalog.
    ///
    /// Ordering is stable (type, then requirement, then id) so repeated
    /// evaluations award in a reproducible order.
    pub fn seed() -> Result<Self, BadgeCatalogError> {
        let mut badges = vec![
            build_badge(BadgeType::Streak, 3)?,
            build_badge(BadgeType::Streak, 7)?,
            build_badge(BadgeType::Streak, 14)?,
            build_badge(BadgeType::Streak, 30)?,
            build_badge(BadgeType::Streak, 100)?,
            build_badge(BadgeType::Milestone, 1)?,
            build_badge(BadgeType::Milestone, 10)?,
            build_badge(BadgeType::Milestone, 50)?,
            build_badge(BadgeType::Milestone, 100)?,
            build_badge(BadgeType::Milestone, 250)?,
            build_badge(BadgeType::Special, 1)?,
            build_badge(BadgeType::Special, 2)?,
            group_badge(1),
            group_badge(3),
        ];

        for category in ["transport", "energy", "waste", "food"] {
            badges.push(build_category_badge(category));
        }

        badges.sort_by(|a, b| {
            a.badge_type
                .cmp(&b.badge_type)
                .then(a.requirement.cmp(&b.requirement))
                .then_with(|| a.id.cmp(&b.id))
        });

        tracing::info!(count = badges.len(), "Badge catalog seeded");

        Ok(Self { badges })
    }

    /// Build a catalog from explicit definitions (tests).
    pub fn from_badges(mut badges: Vec<Badge>) -> Self {
        badges.sort_by(|a, b| {
            a.badge_type
                .cmp(&b.badge_type)
                .then(a.requirement.cmp(&b.requirement))
                .then_with(|| a.id.cmp(&b.id))
        });
        Self { badges }
    }

    /// All badges in stable catalog order.
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    /// Look up a badge by ID.
    pub fn get(&self, badge_id: &str) -> Option<&Badge> {
        self.badges.iter().find(|b| b.id == badge_id)
    }
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
