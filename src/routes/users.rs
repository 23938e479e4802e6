// SPDX-License-Identifier: MIT

//! Profile and user-administration routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::UserRole;
use crate::services::streak::display_streak;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).patch(update_me))
        .route("/api/users/{id}/deactivate", patch(deactivate_user))
}

/// Current user profile.
#[derive(Serialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub total_distance: f64,
    pub total_points: u64,
    pub achievements: Vec<String>,
    /// Display streak: zeroed when more than a day has passed since riding
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<super::ApiResponse<ProfileResponse>>> {
    let profile = state
        .db
        .get_user(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    Ok(super::ok(
        "Profile",
        ProfileResponse {
            user_id: profile.id,
            email: profile.email,
            name: profile.name,
            role: profile.role,
            total_distance: profile.total_distance,
            total_points: profile.total_points,
            achievements: profile.achievements,
            current_streak: display_streak(
                profile.last_ride_date,
                profile.current_streak,
                chrono::Utc::now(),
            ),
            longest_streak: profile.longest_streak,
        },
    ))
}

#[derive(Deserialize, Validate)]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: Option<String>,
}

/// Edit the current user's profile.
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<super::ApiResponse<ProfileResponse>>> {
    payload.validate()?;

    let mut profile = state
        .db
        .get_user(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    if let Some(name) = payload.name {
        profile.name = name.trim().to_string();
    }
    state.db.upsert_user(&profile).await?;

    Ok(super::ok(
        "Profile updated",
        ProfileResponse {
            user_id: profile.id,
            email: profile.email,
            name: profile.name,
            role: profile.role,
            total_distance: profile.total_distance,
            total_points: profile.total_points,
            achievements: profile.achievements,
            current_streak: display_streak(
                profile.last_ride_date,
                profile.current_streak,
                chrono::Utc::now(),
            ),
            longest_streak: profile.longest_streak,
        },
    ))
}

#[derive(Serialize)]
pub struct DeactivateResponse {
    pub user_id: String,
    pub is_active: bool,
}

/// Admin moderation: deactivate an account.
async fn deactivate_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(target_id): Path<String>,
) -> Result<Json<super::ApiResponse<DeactivateResponse>>> {
    if !user.is_admin() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    let mut target = state
        .db
        .get_user(&target_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", target_id)))?;

    target.is_active = false;
    state.db.upsert_user(&target).await?;

    tracing::info!(user_id = %target.id, admin = %user.user_id, "User deactivated");

    Ok(super::ok(
        "User deactivated",
        DeactivateResponse {
            user_id: target.id,
            is_active: false,
        },
    ))
}
