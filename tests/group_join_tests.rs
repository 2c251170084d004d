// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Group membership and notification sink integration tests
//! (require the Firestore emulator).

use ecohabit_tracker::models::Notification;
use ecohabit_tracker::services::{BadgeAwardEngine, BadgeCatalog, NotificationService};

mod common;

#[tokio::test]
async fn test_group_join_is_idempotent_and_counted() {
    require_emulator!();

    let db = common::test_db().await;
    let user_id = format!("joiner-{}", uuid::Uuid::new_v4());
    common::create_test_user(&db, &user_id).await;

    let joined = db
        .join_group_atomic(&user_id, "g-cycling")
        .await
        .expect("join failed");
    assert!(joined);

    // Re-joining the same group is a no-op
    let joined_again = db
        .join_group_atomic(&user_id, "g-cycling")
        .await
        .expect("join failed");
    assert!(!joined_again);

    let joined_other = db
        .join_group_atomic(&user_id, "g-gardening")
        .await
        .expect("join failed");
    assert!(joined_other);

    let facts = db
        .get_facts(&user_id)
        .await
        .expect("get_facts failed")
        .expect("facts missing");
    assert_eq!(facts.groups_joined, 2);
}

#[tokio::test]
async fn test_group_join_triggers_group_badge() {
    require_emulator!();

    let db = common::test_db().await;
    let catalog = BadgeCatalog::seed().unwrap();
    let engine = BadgeAwardEngine::new(db.clone(), catalog);

    let user_id = format!("teamplayer-{}", uuid::Uuid::new_v4());
    common::create_test_user(&db, &user_id).await;

    db.join_group_atomic(&user_id, "g-first")
        .await
        .expect("join failed");

    let newly = engine.check_and_award(&user_id).await.expect("check failed");
    assert!(newly.iter().any(|b| b.id == "group_1"));
    assert!(!newly.iter().any(|b| b.id == "group_3"));
}

#[tokio::test]
async fn test_notification_sink_create_and_list_order() {
    require_emulator!();

    let db = common::test_db().await;
    let catalog = BadgeCatalog::seed().unwrap();
    let notifications = NotificationService::new(db.clone(), catalog);

    let user_id = format!("sink-{}", uuid::Uuid::new_v4());

    for i in 0..3 {
        let notification = Notification {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.clone(),
            kind: "announcement".to_string(),
            title: format!("Update {}", i),
            message: "Something happened".to_string(),
            badge_id: None,
            is_read: false,
            created_at: format!("2024-01-1{}T10:00:00+00:00", i),
        };
        notifications
            .create(&notification)
            .await
            .expect("create failed");
    }

    let listed = notifications
        .list_for_user(&user_id, false)
        .await
        .expect("list failed");

    // Newest first
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].title, "Update 2");
    assert_eq!(listed[2].title, "Update 0");

    // Non-badge notifications have no badge display fields
    assert!(listed[0].badge_name.is_none());
    assert!(listed[0].icon.is_none());
}
