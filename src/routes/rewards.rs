// SPDX-License-Identifier: MIT

//! Reward catalogue and grant-check routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Criteria, Reward, RewardTier};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/rewards", get(list_rewards).post(create_reward))
        .route("/api/rewards/{id}", delete(deactivate_reward))
        .route("/api/rewards/check/{user_id}", post(check_rewards))
}

/// List active reward definitions.
async fn list_rewards(
    State(state): State<Arc<AppState>>,
) -> Result<Json<super::ApiResponse<Vec<Reward>>>> {
    let rewards = state.db.list_active_rewards().await?;
    Ok(super::ok("Rewards", rewards))
}

#[derive(Deserialize, Validate)]
pub struct CreateRewardPayload {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub criteria: Criteria,
    pub points_awarded: u64,
    pub tier: RewardTier,
}

/// Admin: define a new reward.
async fn create_reward(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateRewardPayload>,
) -> Result<Json<super::ApiResponse<Reward>>> {
    if !user.is_admin() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    payload.validate()?;

    if payload.criteria.threshold <= 0.0 {
        return Err(AppError::BadRequest(
            "Criteria threshold must be positive".to_string(),
        ));
    }

    let reward = Reward {
        id: uuid::Uuid::new_v4().to_string(),
        name: payload.name.trim().to_string(),
        description: payload.description,
        criteria: payload.criteria,
        points_awarded: payload.points_awarded,
        tier: payload.tier,
        earned_by: vec![],
        is_active: true,
    };

    state.db.upsert_reward(&reward).await?;
    tracing::info!(reward_id = %reward.id, name = %reward.name, "Reward created");

    Ok(super::ok("Reward created", reward))
}

#[derive(Serialize)]
pub struct DeactivateRewardResponse {
    pub reward_id: String,
    pub is_active: bool,
}

/// Admin: deactivate a reward. Earners keep the achievement; the reward just
/// leaves future evaluation.
async fn deactivate_reward(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(reward_id): Path<String>,
) -> Result<Json<super::ApiResponse<DeactivateRewardResponse>>> {
    if !user.is_admin() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    let mut reward = state
        .db
        .get_reward(&reward_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reward {} not found", reward_id)))?;

    reward.is_active = false;
    state.db.upsert_reward(&reward).await?;

    Ok(super::ok(
        "Reward deactivated",
        DeactivateRewardResponse {
            reward_id,
            is_active: false,
        },
    ))
}

#[derive(Serialize)]
pub struct GrantCheckResponse {
    pub granted: Vec<Reward>,
    pub total_achievements: usize,
}

/// Run a reward grant check for a user (self, or any user for admins).
async fn check_rewards(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<super::ApiResponse<GrantCheckResponse>>> {
    if user.user_id != user_id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Cannot run a grant check for another user".to_string(),
        ));
    }

    let outcome = state.rewards.check_and_grant(&user_id).await?;
    Ok(super::ok(
        "Grant check complete",
        GrantCheckResponse {
            granted: outcome.granted,
            total_achievements: outcome.total_achievements,
        },
    ))
}
