// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod badge;
pub mod facts;
pub mod group;
pub mod notification;
pub mod streak;
pub mod user;

pub use activity::Activity;
pub use badge::{Badge, BadgeType, RequirementKind, UserBadgeAward};
pub use facts::UserFacts;
pub use group::GroupMember;
pub use notification::Notification;
pub use streak::UserStreak;
pub use user::User;
