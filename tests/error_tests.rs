// SPDX-License-Identifier: MIT

//! Error-to-response mapping tests.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use pedalpath::error::{AppError, FieldError};

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_error_kinds_map_to_statuses() {
    let cases: Vec<(AppError, StatusCode)> = vec![
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (AppError::InvalidToken, StatusCode::UNAUTHORIZED),
        (
            AppError::NotFound("x".to_string()),
            StatusCode::NOT_FOUND,
        ),
        (
            AppError::Forbidden("x".to_string()),
            StatusCode::FORBIDDEN,
        ),
        (AppError::Conflict("x".to_string()), StatusCode::CONFLICT),
        (
            AppError::BadRequest("x".to_string()),
            StatusCode::BAD_REQUEST,
        ),
        (
            AppError::ExternalService("x".to_string()),
            StatusCode::BAD_GATEWAY,
        ),
        (
            AppError::Database("x".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (error, expected) in cases {
        let response = error.into_response();
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
async fn test_error_body_shape() {
    let response = AppError::Conflict("User already has an active ride".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["message"], "User already has an active ride");
}

#[tokio::test]
async fn test_validation_error_carries_field_list() {
    let response = AppError::Validation(vec![FieldError {
        field: "email".to_string(),
        message: "must be a valid email address".to_string(),
    }])
    .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "email");
}

#[tokio::test]
async fn test_internal_errors_hide_details() {
    let response = AppError::Database("connection refused at 10.0.0.3".to_string()).into_response();
    let body = body_json(response).await;

    assert_eq!(body["error"], "database_error");
    // Internal detail must not leak to the client
    assert!(body.get("message").is_none() || body["message"].is_null());
}
