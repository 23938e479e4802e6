// SPDX-License-Identifier: MIT

//! Hazard report routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{ConfirmationStatus, Coordinate, Report, ReportCategory, ReportStatus, Severity};
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
        .route("/api/reports", post(create_report).get(list_reports))
        .route("/api/reports/{id}", get(get_report))
        .route("/api/reports/{id}/confirmations", post(confirm_report))
        .route("/api/reports/{id}/status", patch(update_status))
}

#[derive(Deserialize, Validate)]
pub struct CreateReportPayload {
    pub location: Coordinate,
    #[validate(length(min = 1, max = 2000, message = "must be 1-2000 characters"))]
    pub description: String,
    pub category: ReportCategory,
    pub severity: Severity,
}

/// Submit a hazard report.
async fn create_report(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateReportPayload>,
) -> Result<Json<super::ApiResponse<Report>>> {
    payload.validate()?;
    let report = state
        .reports
        .create(
            &user.user_id,
            payload.location,
            payload.description,
            payload.category,
            payload.severity,
        )
        .await?;
    Ok(super::ok("Report created", report))
}

#[derive(Deserialize)]
struct ReportListQuery {
    status: Option<ReportStatus>,
    category: Option<ReportCategory>,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_per_page")]
    per_page: u32,
}

/// Stored enum values are their serde names; queries filter on those strings.
fn serde_name<T: Serialize>(value: T) -> Option<String> {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(String::from))
}

fn default_page() -> u32 {
    1
}
fn default_per_page() -> u32 {
    50
}

#[derive(Serialize)]
pub struct ReportListResponse {
    pub reports: Vec<Report>,
    pub page: u32,
    pub per_page: u32,
}

/// List reports, optionally filtered by status.
async fn list_reports(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportListQuery>,
) -> Result<Json<super::ApiResponse<ReportListResponse>>> {
    if params.page < 1 {
        return Err(AppError::BadRequest(
            "Page must be greater than 0".to_string(),
        ));
    }
    let limit = params.per_page.min(MAX_PER_PAGE);
    let offset = (params.page - 1).saturating_mul(limit);

    let status = params.status.and_then(serde_name);
    let category = params.category.and_then(serde_name);

    let reports = state
        .reports
        .list(status.as_deref(), category.as_deref(), limit, offset)
        .await?;
    Ok(super::ok(
        "Reports",
        ReportListResponse {
            reports,
            page: params.page,
            per_page: limit,
        },
    ))
}

/// Get one report.
async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<String>,
) -> Result<Json<super::ApiResponse<Report>>> {
    let report = state.reports.get(&report_id).await?;
    Ok(super::ok("Report", report))
}

#[derive(Deserialize)]
pub struct ConfirmPayload {
    pub status: ConfirmationStatus,
}

/// Confirm (or re-confirm) someone else's report.
async fn confirm_report(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(report_id): Path<String>,
    Json(payload): Json<ConfirmPayload>,
) -> Result<Json<super::ApiResponse<Report>>> {
    let report = state
        .reports
        .confirm(&report_id, &user.user_id, payload.status)
        .await?;
    Ok(super::ok("Confirmation recorded", report))
}

#[derive(Deserialize)]
pub struct UpdateStatusPayload {
    pub status: ReportStatus,
    pub note: Option<String>,
}

/// Admin moderation: move a report through its state machine.
async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(report_id): Path<String>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<Json<super::ApiResponse<Report>>> {
    if !user.is_admin() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    let report = state
        .reports
        .update_status(&report_id, payload.status, payload.note)
        .await?;
    Ok(super::ok("Report status updated", report))
}
