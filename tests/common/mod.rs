// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use ecohabit_tracker::config::Config;
use ecohabit_tracker::db::FirestoreDb;
use ecohabit_tracker::models::User;
use ecohabit_tracker::routes::create_router;
use ecohabit_tracker::services::BadgeCatalog;
use ecohabit_tracker::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();
    let catalog = BadgeCatalog::seed().expect("Failed to seed badge catalog");

    let state = Arc::new(AppState {
        config,
        db,
        catalog,
    });

    (create_router(state.clone()), state)
}

/// Create a session JWT for tests.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    ecohabit_tracker::middleware::auth::create_jwt(user_id, signing_key)
        .expect("Failed to create test JWT")
}

/// Insert a user profile (emulator tests).
#[allow(dead_code)]
pub async fn create_test_user(db: &FirestoreDb, user_id: &str) {
    let now = chrono::Utc::now().to_rfc3339();
    let user = User {
        user_id: user_id.to_string(),
        email: Some(format!("{}@example.com", user_id)),
        display_name: format!("Test {}", user_id),
        profile_picture: None,
        created_at: now.clone(),
        last_active: now,
    };
    db.upsert_user(&user).await.expect("Failed to create test user");
}
