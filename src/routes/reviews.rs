// SPDX-License-Identifier: MIT

//! Review routes, nested under a route.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::Review;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/routes/{id}/reviews",
            get(list_reviews).post(create_review).patch(update_review),
        )
        .route(
            "/api/routes/{id}/reviews/{reviewer_id}",
            delete(delete_review),
        )
}

#[derive(Deserialize, Validate)]
pub struct CreateReviewPayload {
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: u8,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub comment: Option<String>,
}

/// Create a review for a route; one per (route, reviewer).
async fn create_review(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(route_id): Path<String>,
    Json(payload): Json<CreateReviewPayload>,
) -> Result<Json<super::ApiResponse<Review>>> {
    payload.validate()?;
    let review = state
        .reviews
        .create(&route_id, &user.user_id, payload.rating, payload.comment)
        .await?;
    Ok(super::ok("Review created", review))
}

#[derive(Deserialize, Validate)]
pub struct UpdateReviewPayload {
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: Option<u8>,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub comment: Option<String>,
}

/// Update the requester's own review of a route.
async fn update_review(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(route_id): Path<String>,
    Json(payload): Json<UpdateReviewPayload>,
) -> Result<Json<super::ApiResponse<Review>>> {
    payload.validate()?;
    let review = state
        .reviews
        .update(&route_id, &user.user_id, payload.rating, payload.comment)
        .await?;
    Ok(super::ok("Review updated", review))
}

#[derive(Serialize)]
pub struct DeleteReviewResponse {
    pub route_id: String,
    pub reviewer_id: String,
}

/// Delete a review (own, or any for admins).
async fn delete_review(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((route_id, reviewer_id)): Path<(String, String)>,
) -> Result<Json<super::ApiResponse<DeleteReviewResponse>>> {
    state
        .reviews
        .delete(&route_id, &reviewer_id, &user.user_id, user.is_admin())
        .await?;
    Ok(super::ok(
        "Review deleted",
        DeleteReviewResponse {
            route_id,
            reviewer_id,
        },
    ))
}

/// All reviews for a route.
async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(route_id): Path<String>,
) -> Result<Json<super::ApiResponse<Vec<Review>>>> {
    // 404 for unknown/soft-deleted routes, same as the catalogue get.
    state
        .db
        .get_route(&route_id)
        .await?
        .filter(|r| r.is_active)
        .ok_or_else(|| AppError::NotFound(format!("Route {} not found", route_id)))?;

    let reviews = state.reviews.list_for_route(&route_id).await?;
    Ok(super::ok("Reviews", reviews))
}
