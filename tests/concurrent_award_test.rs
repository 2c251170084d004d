// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Concurrency test: simultaneous badge evaluations must never double-award.

use std::collections::HashMap;

use ecohabit_tracker::models::{UserFacts, UserStreak};
use ecohabit_tracker::services::{BadgeAwardEngine, BadgeCatalog, NotificationService};

mod common;

const NUM_CONCURRENT_CHECKS: usize = 10;

#[tokio::test]
async fn test_concurrent_checks_award_each_badge_once() {
    // This test attempts to reproduce the race where two evaluations both
    // decide a badge is newly satisfied. The transactional insert-if-absent
    // on the award document must de-duplicate them: across all concurrent
    // calls each badge is reported newly-awarded exactly once, and exactly
    // one notification exists per badge.

    require_emulator!();

    let db = common::test_db().await;
    let catalog = BadgeCatalog::seed().unwrap();

    let user_id = format!("race-{}", uuid::Uuid::new_v4());
    common::create_test_user(&db, &user_id).await;

    db.set_facts(
        &user_id,
        &UserFacts {
            total_actions: 10,
            actions_by_category: HashMap::new(),
            actions_by_month: HashMap::new(),
            groups_joined: 1,
            updated_at: chrono::Utc::now().to_rfc3339(),
        },
    )
    .await
    .expect("set_facts failed");

    db.set_streak(&UserStreak {
        user_id: user_id.clone(),
        current_streak: 7,
        last_action_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 10),
        updated_at: String::new(),
    })
    .await
    .expect("set_streak failed");

    // Qualifying badges for these facts
    let expected = ["milestone_1", "milestone_10", "streak_3", "streak_7", "group_1"];

    let mut handles = vec![];
    for _ in 0..NUM_CONCURRENT_CHECKS {
        let engine = BadgeAwardEngine::new(db.clone(), catalog.clone());
        let uid = user_id.clone();
        handles.push(tokio::spawn(
            async move { engine.check_and_award(&uid).await },
        ));
    }

    let mut awarded_counts: HashMap<String, u32> = HashMap::new();
    for handle in handles {
        let newly = handle
            .await
            .expect("Task join failed")
            .expect("Badge check failed");
        for badge in newly {
            *awarded_counts.entry(badge.id).or_insert(0) += 1;
        }
    }

    for badge_id in expected {
        assert_eq!(
            awarded_counts.get(badge_id),
            Some(&1),
            "badge {} must be newly awarded exactly once across all calls",
            badge_id
        );
    }

    // Exactly one notification per awarded badge
    let notifications = NotificationService::new(db.clone(), catalog);
    let listed = notifications
        .list_for_user(&user_id, false)
        .await
        .expect("list failed");
    assert_eq!(
        listed.len(),
        expected.len(),
        "one notification per badge, no duplicates"
    );
}
