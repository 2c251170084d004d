// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scheduled-task endpoint security tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_sweep_without_queue_header_is_forbidden() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tasks/sweep-streaks")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_sweep_with_wrong_queue_name_is_forbidden() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tasks/sweep-streaks")
                .header("x-cloudtasks-queuename", "some-other-queue")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_sweep_with_valid_queue_header_runs() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tasks/sweep-streaks")
                .header(
                    "x-cloudtasks-queuename",
                    ecohabit_tracker::config::SWEEP_QUEUE_NAME,
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // The mock DB is offline, so the sweep itself fails after passing
    // the security check.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
