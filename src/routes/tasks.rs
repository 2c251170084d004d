// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Task handler routes for scheduled maintenance callbacks.
//!
//! These endpoints are called by Cloud Scheduler via Cloud Tasks, not
//! directly by users.

use crate::services::StreakEngine;
use crate::time_utils::today_utc;
use crate::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use std::sync::Arc;

/// Task handler routes (called by Cloud Tasks).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/tasks/sweep-streaks", post(sweep_streaks))
}

/// Reset expired streaks to 0 (daily job).
///
/// This is the only path that can zero a streak after activity has
/// occurred; `recordActivity` handles users who come back on their own.
async fn sweep_streaks(State(state): State<Arc<AppState>>, headers: HeaderMap) -> StatusCode {
    // Security check: ensure the request comes from our queue.
    // Cloud Run strips this header from external requests, so its presence
    // guarantees internal origin.
    let queue_name_header = headers.get("x-cloudtasks-queuename");
    let is_valid_queue = queue_name_header
        .and_then(|h| h.to_str().ok())
        .map(|name| name == crate::config::SWEEP_QUEUE_NAME)
        .unwrap_or(false);

    if !is_valid_queue {
        tracing::warn!(
            header = ?queue_name_header,
            "Security Alert: Blocked unauthorized access to sweep_streaks"
        );
        return StatusCode::FORBIDDEN;
    }

    let engine = StreakEngine::new(state.db.clone(), state.config.streak_grace_days);

    match engine.sweep_expired(today_utc()).await {
        Ok(outcome) => {
            tracing::info!(
                scanned = outcome.scanned,
                reset = outcome.reset,
                failed = outcome.failed,
                "Streak sweep task finished"
            );
            // Partial failures are retried on the next scheduled run
            StatusCode::OK
        }
        Err(e) => {
            tracing::error!(error = %e, "Streak sweep task failed");
            // Return 500 to trigger Cloud Tasks retry
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
