// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! EcoHabit API Server
//!
//! Tracks sustainable everyday actions, maintains per-user day streaks,
//! and awards badges against a declarative rule catalog.

use ecohabit_tracker::{config::Config, db::FirestoreDb, services::BadgeCatalog, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        port = config.port,
        grace_days = config.streak_grace_days,
        "Starting EcoHabit API"
    );

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Seed the badge catalog. Invalid definitions abort startup; nothing
    // here can fail at request time.
    let catalog = BadgeCatalog::seed().expect("Failed to seed badge catalog");
    tracing::info!(count = catalog.badges().len(), "Badge catalog loaded");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        catalog,
    });

    // Build router
    let app = ecohabit_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ecohabit_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
