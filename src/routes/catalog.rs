// SPDX-License-Identifier: MIT

//! Cycling-route catalogue: CRUD, admin verification, and the weather
//! inquiry endpoint.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Coordinate, Difficulty, Route};
use crate::services::external::WeatherConditions;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

const MAX_PER_PAGE: u32 = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/routes", post(create_route).get(list_routes))
        .route(
            "/api/routes/{id}",
            get(get_route).patch(update_route).delete(delete_route),
        )
        .route("/api/routes/{id}/verify", patch(verify_route))
        .route("/api/weather", get(get_weather))
}

fn ensure_owner_or_admin(route: &Route, user: &AuthUser) -> Result<()> {
    if route.creator_id != user.user_id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Route belongs to another user".to_string(),
        ));
    }
    Ok(())
}

// ─── CRUD ────────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CreateRoutePayload {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub start: Coordinate,
    pub end: Coordinate,
    #[serde(default)]
    pub waypoints: Vec<Coordinate>,
    /// User-supplied distance; when absent the routing service (or its
    /// straight-line fallback) fills it in
    #[validate(range(min = 0.01, message = "must be positive"))]
    pub distance_km: Option<f64>,
    pub difficulty: Difficulty,
}

/// Create a route.
async fn create_route(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateRoutePayload>,
) -> Result<Json<super::ApiResponse<Route>>> {
    payload.validate()?;

    let distance_km = match payload.distance_km {
        Some(d) => d,
        None => {
            state
                .routing
                .route_distance_km(payload.start, payload.end, &payload.waypoints)
                .await
        }
    };

    let route = Route {
        id: uuid::Uuid::new_v4().to_string(),
        name: payload.name.trim().to_string(),
        description: payload.description,
        creator_id: user.user_id.clone(),
        start: payload.start,
        end: payload.end,
        waypoints: payload.waypoints,
        distance_km,
        difficulty: payload.difficulty,
        average_rating: 0.0,
        review_count: 0,
        is_verified: false,
        is_active: true,
        created_at: chrono::Utc::now(),
    };

    state.db.upsert_route(&route).await?;
    tracing::info!(route_id = %route.id, creator = %user.user_id, distance_km, "Route created");

    Ok(super::ok("Route created", route))
}

#[derive(Deserialize)]
struct ListQuery {
    difficulty: Option<Difficulty>,
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
pub struct RouteListResponse {
    pub routes: Vec<Route>,
    pub page: u32,
    pub per_page: u32,
}

/// List active routes, newest first.
async fn list_routes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<super::ApiResponse<RouteListResponse>>> {
    if params.page < 1 {
        return Err(AppError::BadRequest(
            "Page must be greater than 0".to_string(),
        ));
    }
    let limit = params.per_page.min(MAX_PER_PAGE);
    let offset = (params.page - 1).saturating_mul(limit);

    // Stored difficulty strings are the enum's serde names.
    let difficulty = params.difficulty.and_then(|d| {
        serde_json::to_value(d)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
    });

    let routes = state
        .db
        .list_routes(difficulty.as_deref(), limit, offset)
        .await?;
    Ok(super::ok(
        "Routes",
        RouteListResponse {
            routes,
            page: params.page,
            per_page: limit,
        },
    ))
}

/// Get one route.
async fn get_route(
    State(state): State<Arc<AppState>>,
    Path(route_id): Path<String>,
) -> Result<Json<super::ApiResponse<Route>>> {
    let route = state
        .db
        .get_route(&route_id)
        .await?
        .filter(|r| r.is_active)
        .ok_or_else(|| AppError::NotFound(format!("Route {} not found", route_id)))?;
    Ok(super::ok("Route", route))
}

#[derive(Deserialize, Validate)]
pub struct UpdateRoutePayload {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
}

/// Update a route (owner or admin).
async fn update_route(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(route_id): Path<String>,
    Json(payload): Json<UpdateRoutePayload>,
) -> Result<Json<super::ApiResponse<Route>>> {
    payload.validate()?;

    let mut route = state
        .db
        .get_route(&route_id)
        .await?
        .filter(|r| r.is_active)
        .ok_or_else(|| AppError::NotFound(format!("Route {} not found", route_id)))?;
    ensure_owner_or_admin(&route, &user)?;

    if let Some(name) = payload.name {
        route.name = name.trim().to_string();
    }
    if payload.description.is_some() {
        route.description = payload.description;
    }
    if let Some(difficulty) = payload.difficulty {
        route.difficulty = difficulty;
    }

    state.db.upsert_route(&route).await?;
    Ok(super::ok("Route updated", route))
}

#[derive(Serialize)]
pub struct DeleteRouteResponse {
    pub route_id: String,
}

/// Soft-delete a route (owner or admin). Rides that reference it keep working.
async fn delete_route(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(route_id): Path<String>,
) -> Result<Json<super::ApiResponse<DeleteRouteResponse>>> {
    let mut route = state
        .db
        .get_route(&route_id)
        .await?
        .filter(|r| r.is_active)
        .ok_or_else(|| AppError::NotFound(format!("Route {} not found", route_id)))?;
    ensure_owner_or_admin(&route, &user)?;

    route.is_active = false;
    state.db.upsert_route(&route).await?;

    tracing::info!(route_id = %route.id, by = %user.user_id, "Route soft-deleted");
    Ok(super::ok(
        "Route deleted",
        DeleteRouteResponse { route_id },
    ))
}

/// Admin-only verification flag.
async fn verify_route(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(route_id): Path<String>,
) -> Result<Json<super::ApiResponse<Route>>> {
    if !user.is_admin() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    let mut route = state
        .db
        .get_route(&route_id)
        .await?
        .filter(|r| r.is_active)
        .ok_or_else(|| AppError::NotFound(format!("Route {} not found", route_id)))?;

    route.is_verified = true;
    state.db.upsert_route(&route).await?;

    Ok(super::ok("Route verified", route))
}

// ─── Weather ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct WeatherQuery {
    lat: f64,
    lon: f64,
}

/// Current conditions at a point, proxied from the weather service.
async fn get_weather(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WeatherQuery>,
) -> Result<Json<super::ApiResponse<WeatherConditions>>> {
    let conditions = state
        .weather
        .current_conditions(Coordinate {
            lat: params.lat,
            lon: params.lon,
        })
        .await?;
    Ok(super::ok("Current conditions", conditions))
}
