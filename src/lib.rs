// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! EcoHabit: gamified tracking of sustainable everyday actions.
//!
//! This crate provides the backend API for logging sustainable actions,
//! maintaining per-user day streaks, and awarding badges.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::BadgeCatalog;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub catalog: BadgeCatalog,
}
