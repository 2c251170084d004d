// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod badges;
pub mod catalog;
pub mod notifications;
pub mod streak;

pub use badges::BadgeAwardEngine;
pub use catalog::{build_badge, BadgeCatalog, BadgeCatalogError};
pub use notifications::NotificationService;
pub use streak::StreakEngine;
