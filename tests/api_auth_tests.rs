// SPDX-License-Identifier: MIT

//! API authentication tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without valid tokens
//! 2. Protected routes accept requests with valid tokens
//! 3. Public routes (health, auth) skip the auth middleware

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use pedalpath::middleware::auth::create_jwt;
use pedalpath::models::UserRole;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/rides/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/rides/stats")
                .header(header::AUTHORIZATION, "Bearer invalid.token.here")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_valid_token_reaches_handler() {
    let (app, state) = common::create_test_app();
    let token = create_jwt("user-1", UserRole::Cyclist, &state.config.jwt_signing_key).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/rides/stats")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Offline mock DB: the handler runs and fails at the database layer,
    // which proves the token got past the middleware.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_endpoint_rejects_cyclist_role() {
    let (app, state) = common::create_test_app();
    let token = create_jwt("user-1", UserRole::Cyclist, &state.config.jwt_signing_key).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/rewards")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"name":"Test","criteria":{"type":"ridesCompleted","threshold":1},"points_awarded":10,"tier":"bronze"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
