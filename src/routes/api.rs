// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::badge::Badge;
use crate::models::Activity;
use crate::services::notifications::NotificationPayload;
use crate::services::streak::{StreakInfo, StreakWarning};
use crate::services::{BadgeAwardEngine, NotificationService, StreakEngine};
use crate::time_utils::{parse_iso_date, today_utc};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_TITLE_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 50;
const MAX_DESCRIPTION_LEN: usize = 2000;
const MAX_GROUP_ID_LEN: usize = 64;

const MAX_PER_PAGE: u32 = 100;
const CURSOR_PARTS: usize = 2;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/actions", post(create_action).get(get_actions))
        .route("/api/streak", get(get_streak))
        .route("/api/stats", get(get_stats))
        .route("/api/badges", get(get_badges))
        .route("/api/groups/{group_id}/join", post(join_group))
        .route("/api/notifications", get(get_notifications))
        .route("/api/notifications/unread-count", get(get_unread_count))
        .route("/api/notifications/{id}/read", post(mark_notification_read))
        .route("/api/notifications/read-all", post(mark_all_read))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub user_id: String,
    pub display_name: String,
    pub profile_picture: Option<String>,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state
        .db
        .get_user(&user.user_id)
        .await?
        .ok_or_else(|| AppError::user_not_found(&user.user_id))?;

    Ok(Json(UserResponse {
        user_id: profile.user_id,
        display_name: profile.display_name,
        profile_picture: profile.profile_picture,
    }))
}

// ─── Action Logging ──────────────────────────────────────────

#[derive(Deserialize)]
struct CreateActionRequest {
    title: String,
    category: String,
    /// Calendar date (`YYYY-MM-DD`); defaults to today (UTC)
    occurred_on: Option<String>,
    description: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CreateActionResponse {
    pub activity_id: String,
    pub current_streak: u32,
    /// Badges newly awarded by this action
    pub newly_awarded: Vec<BadgeSummary>,
}

/// Log a sustainable action.
///
/// The streak update is part of the request's success: its failure surfaces
/// as a server error. The badge pass that follows is best-effort; its
/// failure is logged and deferred to the next triggering event.
async fn create_action(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateActionRequest>,
) -> Result<Json<CreateActionResponse>> {
    let title = payload.title.trim();
    if title.is_empty() || title.len() > MAX_TITLE_LEN {
        return Err(AppError::BadRequest(format!(
            "Title must be 1-{} characters",
            MAX_TITLE_LEN
        )));
    }

    let category = payload.category.trim().to_lowercase();
    if category.is_empty() || category.len() > MAX_CATEGORY_LEN {
        return Err(AppError::BadRequest(format!(
            "Category must be 1-{} characters",
            MAX_CATEGORY_LEN
        )));
    }

    if let Some(description) = payload.description.as_deref() {
        if description.len() > MAX_DESCRIPTION_LEN {
            return Err(AppError::BadRequest(format!(
                "Description must be at most {} characters",
                MAX_DESCRIPTION_LEN
            )));
        }
    }

    let today = today_utc();
    let occurred_on = match payload.occurred_on.as_deref() {
        Some(raw) => parse_iso_date(raw).ok_or_else(|| {
            AppError::BadRequest("Invalid 'occurred_on': must be YYYY-MM-DD".to_string())
        })?,
        None => today,
    };
    if occurred_on > today {
        return Err(AppError::BadRequest(
            "'occurred_on' cannot be in the future".to_string(),
        ));
    }

    let activity = Activity {
        activity_id: uuid::Uuid::new_v4().to_string(),
        user_id: user.user_id.clone(),
        title: title.to_string(),
        category,
        occurred_on,
        description: payload.description,
        source: "api".to_string(),
        processed_at: chrono::Utc::now().to_rfc3339(),
    };

    let streak_engine = StreakEngine::new(state.db.clone(), state.config.streak_grace_days);
    let current_streak = streak_engine.record_activity(&activity).await?;

    // Best-effort badge pass: never fails the logged action
    let badge_engine = BadgeAwardEngine::new(state.db.clone(), state.catalog.clone());
    let newly_awarded = match badge_engine.check_and_award(&user.user_id).await {
        Ok(badges) => badges,
        Err(e) => {
            tracing::error!(
                user_id = %user.user_id,
                error = %e,
                "Badge check failed after action"
            );
            vec![]
        }
    };

    Ok(Json(CreateActionResponse {
        activity_id: activity.activity_id,
        current_streak,
        newly_awarded: newly_awarded
            .into_iter()
            .map(|b| badge_summary(&b, None))
            .collect(),
    }))
}

// ─── Action Listing ──────────────────────────────────────────

#[derive(Deserialize)]
struct ActionsQuery {
    /// Cursor for forward pagination (opaque token).
    cursor: Option<String>,
    /// Pagination: items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    50
}

/// Decoded pagination cursor: the sort position of the last seen item.
#[derive(Debug, Clone, PartialEq)]
struct ActionCursor {
    processed_at: String,
    activity_id: String,
}

fn parse_cursor(cursor: Option<&str>) -> Result<Option<ActionCursor>> {
    cursor
        .map(|raw| {
            let invalid_cursor =
                || AppError::BadRequest("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;

            let parts: Vec<&str> = decoded_str.split('|').collect();
            if parts.len() != CURSOR_PARTS {
                return Err(invalid_cursor());
            }

            // The timestamp half must be a real RFC3339 instant
            chrono::DateTime::parse_from_rfc3339(parts[0]).map_err(|_| invalid_cursor())?;

            Ok(ActionCursor {
                processed_at: parts[0].to_string(),
                activity_id: parts[1].to_string(),
            })
        })
        .transpose()
}

fn encode_cursor(cursor: &ActionCursor) -> String {
    let payload = format!("{}|{}", cursor.processed_at, cursor.activity_id);
    URL_SAFE_NO_PAD.encode(payload)
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActionsResponse {
    pub actions: Vec<ActionSummary>,
    pub per_page: u32,
    pub next_cursor: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActionSummary {
    pub id: String,
    pub title: String,
    pub category: String,
    pub occurred_on: String,
    pub description: Option<String>,
}

/// Get user's logged actions, newest first, with cursor pagination.
async fn get_actions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ActionsQuery>,
) -> Result<Json<ActionsResponse>> {
    let limit = params.per_page.clamp(1, MAX_PER_PAGE);
    let cursor = parse_cursor(params.cursor.as_deref())?;

    // Fetch one extra item to determine if another page is available.
    let fetch_limit = limit.saturating_add(1);
    let mut activities = state
        .db
        .get_activities_for_user(
            &user.user_id,
            cursor.as_ref().map(|c| c.processed_at.as_str()),
            fetch_limit,
        )
        .await?;

    let has_more = activities.len() > limit as usize;
    if has_more {
        activities.truncate(limit as usize);
    }

    let next_cursor = if has_more {
        activities.last().map(|a| {
            encode_cursor(&ActionCursor {
                processed_at: a.processed_at.clone(),
                activity_id: a.activity_id.clone(),
            })
        })
    } else {
        None
    };

    let actions = activities
        .into_iter()
        .map(|a| ActionSummary {
            id: a.activity_id,
            title: a.title,
            category: a.category,
            occurred_on: a.occurred_on.to_string(),
            description: a.description,
        })
        .collect();

    Ok(Json(ActionsResponse {
        actions,
        per_page: limit,
        next_cursor,
    }))
}

// ─── Streak ──────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StreakResponse {
    pub current_streak: u32,
    pub last_action_date: Option<String>,
    pub is_active: bool,
    pub warning: StreakWarning,
}

/// Get current streak state with the expiry warning.
async fn get_streak(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StreakResponse>> {
    let engine = StreakEngine::new(state.db.clone(), state.config.streak_grace_days);
    let today = today_utc();

    let StreakInfo {
        current_streak,
        last_action_date,
        is_active,
    } = engine.streak_info(&user.user_id, today).await?;
    let warning = engine.streak_warning(&user.user_id, today).await?;

    Ok(Json(StreakResponse {
        current_streak,
        last_action_date,
        is_active,
        warning,
    }))
}

// ─── Stats ───────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatsResponse {
    pub total_actions: u32,
    pub actions_by_category: HashMap<String, u32>,
    pub actions_by_month: HashMap<String, u32>,
    pub groups_joined: u32,
}

/// Get fact aggregates for the dashboard.
///
/// Uses the pre-computed `user_facts` document (1 read).
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatsResponse>> {
    let facts = state.db.get_facts(&user.user_id).await?.unwrap_or_default();

    Ok(Json(StatsResponse {
        total_actions: facts.total_actions,
        actions_by_category: facts.actions_by_category,
        actions_by_month: facts.actions_by_month,
        groups_joined: facts.groups_joined,
    }))
}

// ─── Badges ──────────────────────────────────────────────────

#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BadgeSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub badge_type: String,
    pub icon: String,
    pub requirement: u32,
    pub points: u32,
    /// Set when the user has earned the badge
    pub earned_at: Option<String>,
}

fn badge_summary(badge: &Badge, earned_at: Option<String>) -> BadgeSummary {
    BadgeSummary {
        id: badge.id.clone(),
        name: badge.name.clone(),
        description: badge.description.clone(),
        badge_type: badge.badge_type.as_str().to_string(),
        icon: badge.icon.clone(),
        requirement: badge.requirement,
        points: badge.points,
        earned_at,
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BadgesResponse {
    pub badges: Vec<BadgeSummary>,
    pub earned_count: u32,
    pub total_points: u32,
}

/// Get the full catalog with the user's earned state.
async fn get_badges(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<BadgesResponse>> {
    let awards = state.db.get_awarded_badges(&user.user_id).await?;
    let earned_at: HashMap<String, String> = awards
        .into_iter()
        .map(|a| (a.badge_id, a.earned_at))
        .collect();

    let badges: Vec<BadgeSummary> = state
        .catalog
        .badges()
        .iter()
        .map(|b| badge_summary(b, earned_at.get(&b.id).cloned()))
        .collect();

    let earned_count = badges.iter().filter(|b| b.earned_at.is_some()).count() as u32;
    let total_points: u32 = badges
        .iter()
        .filter(|b| b.earned_at.is_some())
        .map(|b| b.points)
        .sum();

    Ok(Json(BadgesResponse {
        badges,
        earned_count,
        total_points,
    }))
}

// ─── Groups ──────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct JoinGroupResponse {
    /// False if the user was already a member
    pub joined: bool,
    pub groups_joined: u32,
    pub newly_awarded: Vec<BadgeSummary>,
}

/// Record a group membership.
///
/// Group discovery and invite codes live in the groups service; this
/// endpoint only maintains the membership fact and re-runs badge rules.
async fn join_group(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(group_id): Path<String>,
) -> Result<Json<JoinGroupResponse>> {
    if group_id.is_empty() || group_id.len() > MAX_GROUP_ID_LEN {
        return Err(AppError::BadRequest(format!(
            "Group ID must be 1-{} characters",
            MAX_GROUP_ID_LEN
        )));
    }

    let joined = state.db.join_group_atomic(&user.user_id, &group_id).await?;

    let newly_awarded = if joined {
        let badge_engine = BadgeAwardEngine::new(state.db.clone(), state.catalog.clone());
        match badge_engine.check_and_award(&user.user_id).await {
            Ok(badges) => badges,
            Err(e) => {
                tracing::error!(
                    user_id = %user.user_id,
                    error = %e,
                    "Badge check failed after group join"
                );
                vec![]
            }
        }
    } else {
        vec![]
    };

    let facts = state.db.get_facts(&user.user_id).await?.unwrap_or_default();

    Ok(Json(JoinGroupResponse {
        joined,
        groups_joined: facts.groups_joined,
        newly_awarded: newly_awarded
            .into_iter()
            .map(|b| badge_summary(&b, None))
            .collect(),
    }))
}

// ─── Notifications ───────────────────────────────────────────

#[derive(Deserialize)]
struct NotificationsQuery {
    #[serde(default)]
    unread_only: bool,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NotificationsResponse {
    pub notifications: Vec<NotificationPayload>,
}

/// Get notifications for the current user, newest first.
async fn get_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<NotificationsQuery>,
) -> Result<Json<NotificationsResponse>> {
    let service = NotificationService::new(state.db.clone(), state.catalog.clone());
    let notifications = service
        .list_for_user(&user.user_id, params.unread_only)
        .await?;

    Ok(Json(NotificationsResponse { notifications }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UnreadCountResponse {
    pub unread: u32,
}

/// Count unread notifications.
async fn get_unread_count(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UnreadCountResponse>> {
    let service = NotificationService::new(state.db.clone(), state.catalog.clone());
    let unread = service.unread_count(&user.user_id).await?;

    Ok(Json(UnreadCountResponse { unread }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MarkReadResponse {
    pub success: bool,
}

/// Mark one notification read (no-op if missing or foreign).
async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MarkReadResponse>> {
    let service = NotificationService::new(state.db.clone(), state.catalog.clone());
    service.mark_read(&id, &user.user_id).await?;

    Ok(Json(MarkReadResponse { success: true }))
}

/// Mark all of the user's notifications read.
async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MarkReadResponse>> {
    let service = NotificationService::new(state.db.clone(), state.catalog.clone());
    let updated = service.mark_all_read(&user.user_id).await?;

    tracing::debug!(user_id = %user.user_id, updated, "Marked all notifications read");

    Ok(Json(MarkReadResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_round_trip() {
        let cursor = ActionCursor {
            processed_at: "2024-01-15T10:30:00.123456789+00:00".to_string(),
            activity_id: "3f1d9a2c".to_string(),
        };

        let encoded = encode_cursor(&cursor);
        let decoded = parse_cursor(Some(&encoded)).unwrap().unwrap();

        assert_eq!(decoded, cursor);
    }

    #[test]
    fn test_cursor_rejects_invalid_input() {
        let err = parse_cursor(Some("not-base64!")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        // Well-formed base64 but not a timestamp|id payload
        let bogus = URL_SAFE_NO_PAD.encode("just-one-part");
        let err = parse_cursor(Some(&bogus)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let bad_ts = URL_SAFE_NO_PAD.encode("yesterday|abc");
        let err = parse_cursor(Some(&bad_ts)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
