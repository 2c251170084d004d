// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile reads)
//! - Activities (logged sustainable actions)
//! - Streaks (per-user day-streak documents)
//! - Facts (per-user aggregates used by badge rules)
//! - Badge awards and notifications
//!
//! All read-modify-write paths run inside Firestore transactions so that
//! concurrent requests for the same user cannot lose updates or award a
//! badge twice.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Activity, GroupMember, Notification, User, UserBadgeAward, UserFacts, UserStreak};
use crate::models::badge::Badge;
use chrono::NaiveDate;
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user profile by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user profile.
    ///
    /// Registration lives in the auth service; this exists for test setup
    /// and profile refreshes.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Streak / Fact Reads ─────────────────────────────────────

    /// Get a user's streak document.
    pub async fn get_streak(&self, user_id: &str) -> Result<Option<UserStreak>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_STREAKS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user's fact aggregate document.
    pub async fn get_facts(&self, user_id: &str) -> Result<Option<UserFacts>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_FACTS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a streak document directly (sweep resets and test setup).
    pub async fn set_streak(&self, streak: &UserStreak) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_STREAKS)
            .document_id(&streak.user_id)
            .object(streak)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Store a fact aggregate directly (test setup).
    pub async fn set_facts(&self, user_id: &str, facts: &UserFacts) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_FACTS)
            .document_id(user_id)
            .object(facts)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Atomic Activity Processing ──────────────────────────────

    /// Atomically process a logged action: store the activity, advance the
    /// streak, and update the fact aggregate.
    ///
    /// This method uses a Firestore transaction so all writes succeed or fail
    /// together. If another request modifies the same user's documents
    /// concurrently, Firestore retries the transaction with fresh data,
    /// preventing lost streak updates.
    ///
    /// Returns the streak value after the update.
    pub async fn record_activity_atomic(
        &self,
        activity: &Activity,
        grace_days: u32,
    ) -> Result<u32, AppError> {
        let user_id = activity.user_id.clone();
        let now = chrono::Utc::now().to_rfc3339();

        // Safety check: the streak contract requires an existing user.
        if self.get_user(&user_id).await?.is_none() {
            return Err(AppError::user_not_found(&user_id));
        }

        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // 1. Read current streak and facts within the transaction
        //    This registers the documents for conflict detection
        let streak: Option<UserStreak> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_STREAKS)
            .obj()
            .one(&user_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read streak in transaction: {}", e))
            })?;

        let facts: Option<UserFacts> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_FACTS)
            .obj()
            .one(&user_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read facts in transaction: {}", e))
            })?;

        let mut streak = streak.unwrap_or_else(|| UserStreak::new(&user_id));
        let mut facts = facts.unwrap_or_default();

        // 2. Apply the streak transition and fact updates in memory
        let new_streak = streak.apply_action(activity.occurred_on, grace_days, &now);
        facts.update_from_activity(activity, &now);

        // 3. Add all writes to the transaction
        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::ACTIVITIES)
            .document_id(&activity.activity_id)
            .object(activity)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add activity to transaction: {}", e))
            })?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_STREAKS)
            .document_id(&user_id)
            .object(&streak)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add streak to transaction: {}", e))
            })?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_FACTS)
            .document_id(&user_id)
            .object(&facts)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add facts to transaction: {}", e))
            })?;

        // 4. Commit atomically
        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            user_id = %user_id,
            activity_id = %activity.activity_id,
            streak = new_streak,
            "Action processed atomically"
        );

        Ok(new_streak)
    }

    // ─── Activity Queries ────────────────────────────────────────

    /// Get a single activity by ID.
    pub async fn get_activity(&self, activity_id: &str) -> Result<Option<Activity>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACTIVITIES)
            .obj()
            .one(activity_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get activities for a user, newest first, with cursor pagination.
    ///
    /// The cursor is the `processed_at` timestamp of the last item of the
    /// previous page; RFC3339 strings with a fixed offset compare
    /// chronologically.
    pub async fn get_activities_for_user(
        &self,
        user_id: &str,
        before: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Activity>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES);

        let uid = user_id.to_string();
        let query = if let Some(cursor) = before {
            let cursor = cursor.to_string();
            query.filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(uid.clone()),
                    q.field("processed_at").less_than(cursor.clone()),
                ])
            })
        } else {
            query.filter(move |q| q.field("user_id").eq(uid.clone()))
        };

        query
            .order_by([(
                "processed_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Badge Award Operations ──────────────────────────────────

    /// Get all badges already awarded to a user.
    pub async fn get_awarded_badges(&self, user_id: &str) -> Result<Vec<UserBadgeAward>, AppError> {
        let uid = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USER_BADGES)
            .filter(move |q| q.field("user_id").eq(uid.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Atomically award a badge and create its notification.
    ///
    /// The award document ID is `{user_id}_{badge_id}`, read back inside the
    /// transaction, so two concurrent evaluations of the same user can never
    /// produce two awards or two notifications for one badge.
    ///
    /// Returns `true` if the badge was newly awarded, `false` if the user
    /// already held it.
    pub async fn award_badge_atomic(
        &self,
        user_id: &str,
        badge: &Badge,
    ) -> Result<bool, AppError> {
        let doc_id = format!("{}_{}", user_id, badge.id);
        let now = chrono::Utc::now().to_rfc3339();

        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let existing: Option<UserBadgeAward> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_BADGES)
            .obj()
            .one(&doc_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read award in transaction: {}", e))
            })?;

        if existing.is_some() {
            // Already held: an insert-or-ignore hit. Not newly awarded.
            let _ = transaction.rollback().await;
            return Ok(false);
        }

        let award = UserBadgeAward {
            user_id: user_id.to_string(),
            badge_id: badge.id.clone(),
            earned_at: now.clone(),
        };
        let notification = Notification::badge_earned(user_id, badge, &now);

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_BADGES)
            .document_id(&doc_id)
            .object(&award)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add award to transaction: {}", e))
            })?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::NOTIFICATIONS)
            .document_id(&notification.id)
            .object(&notification)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add notification to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            user_id = %user_id,
            badge_id = %badge.id,
            points = badge.points,
            "Badge awarded"
        );

        Ok(true)
    }

    // ─── Group Membership ────────────────────────────────────────

    /// Atomically record a group membership and bump `groups_joined`.
    ///
    /// Returns `true` if the membership is new, `false` if the user was
    /// already a member (idempotent join).
    pub async fn join_group_atomic(
        &self,
        user_id: &str,
        group_id: &str,
    ) -> Result<bool, AppError> {
        let doc_id = format!("{}_{}", user_id, group_id);
        let now = chrono::Utc::now().to_rfc3339();

        if self.get_user(user_id).await?.is_none() {
            return Err(AppError::user_not_found(user_id));
        }

        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let existing: Option<GroupMember> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::GROUP_MEMBERS)
            .obj()
            .one(&doc_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read membership in transaction: {}", e))
            })?;

        if existing.is_some() {
            let _ = transaction.rollback().await;
            return Ok(false);
        }

        let facts: Option<UserFacts> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_FACTS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read facts in transaction: {}", e))
            })?;

        let mut facts = facts.unwrap_or_default();
        facts.record_group_join(&now);

        let member = GroupMember {
            user_id: user_id.to_string(),
            group_id: group_id.to_string(),
            joined_at: now,
        };

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::GROUP_MEMBERS)
            .document_id(&doc_id)
            .object(&member)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add membership to transaction: {}", e))
            })?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_FACTS)
            .document_id(user_id)
            .object(&facts)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add facts to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(user_id = %user_id, group_id = %group_id, "Group joined");

        Ok(true)
    }

    // ─── Streak Sweep ────────────────────────────────────────────

    /// Find streak documents whose last action predates `cutoff`.
    ///
    /// Users who never logged anything have no `last_action_date` field and
    /// are excluded by the range filter; the non-zero streak check happens
    /// in the caller since Firestore allows one inequality field per query.
    pub async fn get_streaks_older_than(
        &self,
        cutoff: NaiveDate,
    ) -> Result<Vec<UserStreak>, AppError> {
        let cutoff = cutoff.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USER_STREAKS)
            .filter(move |q| q.field("last_action_date").less_than(cutoff.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reset one streak to 0 if it is still expired as of `today`.
    ///
    /// Re-reads the document inside a transaction so a user who logs an
    /// action while the sweep runs keeps their fresh streak.
    pub async fn reset_streak_if_expired(
        &self,
        user_id: &str,
        today: NaiveDate,
        grace_days: u32,
    ) -> Result<bool, AppError> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let streak: Option<UserStreak> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_STREAKS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read streak in transaction: {}", e))
            })?;

        let mut streak = match streak {
            Some(s) if s.is_expired(today, grace_days) => s,
            _ => {
                let _ = transaction.rollback().await;
                return Ok(false);
            }
        };

        streak.current_streak = 0;
        streak.updated_at = now;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_STREAKS)
            .document_id(user_id)
            .object(&streak)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add streak reset to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(true)
    }

    // ─── Notification Operations ─────────────────────────────────

    /// Insert one notification (unread).
    pub async fn create_notification(&self, notification: &Notification) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::NOTIFICATIONS)
            .document_id(&notification.id)
            .object(notification)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get notifications for a user, newest first.
    pub async fn get_notifications_for_user(
        &self,
        user_id: &str,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::NOTIFICATIONS);

        let uid = user_id.to_string();
        let query = if unread_only {
            query.filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(uid.clone()),
                    q.field("is_read").eq(false),
                ])
            })
        } else {
            query.filter(move |q| q.field("user_id").eq(uid.clone()))
        };

        query
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark one notification read.
    ///
    /// No-op (returns `false`) if the notification does not exist or does
    /// not belong to the user.
    pub async fn mark_notification_read(
        &self,
        notification_id: &str,
        user_id: &str,
    ) -> Result<bool, AppError> {
        let notification: Option<Notification> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::NOTIFICATIONS)
            .obj()
            .one(notification_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut notification = match notification {
            Some(n) if n.user_id == user_id => n,
            _ => return Ok(false),
        };

        if notification.is_read {
            return Ok(true);
        }
        notification.is_read = true;

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::NOTIFICATIONS)
            .document_id(&notification.id)
            .object(&notification)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(true)
    }

    /// Get every unread notification for a user (no page cap).
    async fn get_unread_notifications(&self, user_id: &str) -> Result<Vec<Notification>, AppError> {
        let uid = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::NOTIFICATIONS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(uid.clone()),
                    q.field("is_read").eq(false),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark every notification owned by the user read.
    ///
    /// Uses concurrent writes with a limit to avoid overloading Firestore.
    /// Returns the number of notifications updated.
    pub async fn mark_all_notifications_read(&self, user_id: &str) -> Result<usize, AppError> {
        let unread = self.get_unread_notifications(user_id).await?;
        let count = unread.len();
        let client = self.get_client()?;

        stream::iter(unread)
            .map(|mut notification| async move {
                notification.is_read = true;

                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::NOTIFICATIONS)
                    .document_id(&notification.id)
                    .object(&notification)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                Ok::<_, AppError>(())
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(count)
    }

    /// Count unread notifications for a user.
    pub async fn unread_notification_count(&self, user_id: &str) -> Result<u32, AppError> {
        let unread = self.get_unread_notifications(user_id).await?;
        Ok(unread.len() as u32)
    }
}
