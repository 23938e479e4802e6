// SPDX-License-Identifier: MIT

//! Ride lifecycle routes: thin adapters over `services::ride`.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::Ride;
use crate::services::ride::RideStats;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MAX_PER_PAGE: u32 = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/rides/start", post(start_ride))
        .route("/api/rides/{id}/complete", patch(complete_ride))
        .route("/api/rides/{id}/cancel", patch(cancel_ride))
        .route("/api/rides", get(list_rides))
        .route("/api/rides/active", get(get_active_ride))
        .route("/api/rides/stats", get(get_ride_stats))
}

#[derive(Deserialize)]
pub struct StartRidePayload {
    pub route_id: String,
}

/// Start a ride on a route.
async fn start_ride(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<StartRidePayload>,
) -> Result<Json<super::ApiResponse<Ride>>> {
    let ride = state.rides.start(&user.user_id, &payload.route_id).await?;
    Ok(super::ok("Ride started", ride))
}

/// Complete the requester's active ride.
async fn complete_ride(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(ride_id): Path<String>,
) -> Result<Json<super::ApiResponse<Ride>>> {
    let ride = state.rides.complete(&ride_id, &user.user_id).await?;
    Ok(super::ok("Ride completed", ride))
}

/// Cancel the requester's active ride.
async fn cancel_ride(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(ride_id): Path<String>,
) -> Result<Json<super::ApiResponse<Ride>>> {
    let ride = state.rides.cancel(&ride_id, &user.user_id).await?;
    Ok(super::ok("Ride cancelled", ride))
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_page() -> u32 {
    1
}
fn default_per_page() -> u32 {
    50
}

#[derive(Serialize)]
pub struct RideListResponse {
    pub rides: Vec<Ride>,
    pub page: u32,
    pub per_page: u32,
}

/// List the requester's rides, newest first.
async fn list_rides(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListQuery>,
) -> Result<Json<super::ApiResponse<RideListResponse>>> {
    if params.page < 1 {
        return Err(AppError::BadRequest(
            "Page must be greater than 0".to_string(),
        ));
    }
    let limit = params.per_page.min(MAX_PER_PAGE);
    let offset = (params.page - 1).saturating_mul(limit);

    let rides = state.rides.list(&user.user_id, limit, offset).await?;
    Ok(super::ok(
        "Rides",
        RideListResponse {
            rides,
            page: params.page,
            per_page: limit,
        },
    ))
}

/// The requester's active ride, if any.
async fn get_active_ride(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<super::ApiResponse<Option<Ride>>>> {
    let ride = state.rides.active_ride(&user.user_id).await?;
    Ok(super::ok("Active ride", ride))
}

/// The requester's ride statistics (with display-time streak decay).
async fn get_ride_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<super::ApiResponse<RideStats>>> {
    let stats = state.rides.ride_stats(&user.user_id).await?;
    Ok(super::ok("Ride stats", stats))
}
