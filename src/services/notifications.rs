// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notification sink: append and query user notifications.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::Notification;
use crate::services::catalog::BadgeCatalog;

/// Fixed page size for notification listings.
const PAGE_SIZE: u32 = 20;

/// Notification payload for the UI, with badge display fields joined in.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NotificationPayload {
    pub id: String,
    pub title: String,
    pub message: String,
    /// Badge icon, when the notification references a badge
    pub icon: Option<String>,
    pub badge_name: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

/// Append-only log of user-facing messages with read/unread state.
pub struct NotificationService {
    db: FirestoreDb,
    catalog: BadgeCatalog,
}

impl NotificationService {
    pub fn new(db: FirestoreDb, catalog: BadgeCatalog) -> Self {
        Self { db, catalog }
    }

    /// Append one notification.
    ///
    /// Badge-award notifications are written inside the award transaction;
    /// this path serves the other notification kinds.
    pub async fn create(&self, notification: &Notification) -> Result<()> {
        self.db.create_notification(notification).await
    }

    /// Notifications for a user, newest first, capped at one page.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        unread_only: bool,
    ) -> Result<Vec<NotificationPayload>> {
        let notifications = self
            .db
            .get_notifications_for_user(user_id, unread_only, PAGE_SIZE)
            .await?;

        Ok(notifications
            .into_iter()
            .map(|n| self.to_payload(n))
            .collect())
    }

    /// Mark one notification read; no-op if it is missing or foreign.
    pub async fn mark_read(&self, notification_id: &str, user_id: &str) -> Result<()> {
        let updated = self
            .db
            .mark_notification_read(notification_id, user_id)
            .await?;

        if !updated {
            tracing::debug!(
                notification_id = %notification_id,
                user_id = %user_id,
                "Mark-read skipped: notification missing or not owned"
            );
        }

        Ok(())
    }

    /// Mark every notification owned by the user read.
    pub async fn mark_all_read(&self, user_id: &str) -> Result<usize> {
        self.db.mark_all_notifications_read(user_id).await
    }

    /// Number of unread notifications for the user.
    pub async fn unread_count(&self, user_id: &str) -> Result<u32> {
        self.db.unread_notification_count(user_id).await
    }

    fn to_payload(&self, notification: Notification) -> NotificationPayload {
        let badge = notification
            .badge_id
            .as_deref()
            .and_then(|id| self.catalog.get(id));

        NotificationPayload {
            id: notification.id,
            title: notification.title,
            message: notification.message,
            icon: badge.map(|b| b.icon.clone()),
            badge_name: badge.map(|b| b.name.clone()),
            is_read: notification.is_read,
            created_at: notification.created_at,
        }
    }
}
