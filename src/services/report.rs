// SPDX-License-Identifier: MIT

//! Hazard report service: creation, community confirmations with
//! auto-resolution, and admin status moderation.

use chrono::Utc;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::report::{AUTO_RESOLVE_CONFIRMATIONS, REPORT_SUBMISSION_POINTS};
use crate::models::{
    Confirmation, ConfirmationStatus, Report, ReportCategory, ReportStatus, Severity,
};
use crate::services::RewardEngine;
use crate::time_utils::format_utc_rfc3339;

#[derive(Clone)]
pub struct ReportService {
    db: FirestoreDb,
    rewards: RewardEngine,
}

impl ReportService {
    pub fn new(db: FirestoreDb, rewards: RewardEngine) -> Self {
        Self { db, rewards }
    }

    /// Create a hazard report, award submission points, and run a
    /// best-effort reward check.
    pub async fn create(
        &self,
        reporter_id: &str,
        location: crate::models::Coordinate,
        description: String,
        category: ReportCategory,
        severity: Severity,
    ) -> Result<Report> {
        let report = Report {
            id: uuid::Uuid::new_v4().to_string(),
            reporter_id: reporter_id.to_string(),
            location,
            description,
            category,
            severity,
            status: ReportStatus::Open,
            confirmations: vec![],
            admin_notes: vec![],
            created_at: Utc::now(),
        };

        self.db.upsert_report(&report).await?;

        if let Some(mut user) = self.db.get_user(reporter_id).await? {
            user.total_points += REPORT_SUBMISSION_POINTS;
            self.db.upsert_user(&user).await?;
        }

        tracing::info!(report_id = %report.id, reporter_id, "Report created");

        self.rewards.check_and_grant_best_effort(reporter_id).await;

        Ok(report)
    }

    /// Add or update a user's confirmation on a report.
    ///
    /// One confirmation per user (upsert in place); not the reporter's own
    /// report; not once the report is terminal. Three distinct `resolved`
    /// confirmations auto-resolve the report with an audit note.
    pub async fn confirm(
        &self,
        report_id: &str,
        user_id: &str,
        status: ConfirmationStatus,
    ) -> Result<Report> {
        let mut report = self
            .db
            .get_report(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))?;

        if report.reporter_id == user_id {
            return Err(AppError::BadRequest(
                "You cannot confirm your own report".to_string(),
            ));
        }
        if report.status.is_terminal() {
            return Err(AppError::BadRequest(
                "Report is already resolved or dismissed".to_string(),
            ));
        }

        report.upsert_confirmation(Confirmation {
            user_id: user_id.to_string(),
            status,
            confirmed_at: Utc::now(),
        });

        if report.resolved_confirmation_count() >= AUTO_RESOLVE_CONFIRMATIONS {
            report.status = ReportStatus::Resolved;
            report.admin_notes.push(format!(
                "Auto-resolved on {}: {} community members confirmed resolution",
                format_utc_rfc3339(Utc::now()),
                report.resolved_confirmation_count()
            ));
            tracing::info!(report_id = %report.id, "Report auto-resolved by community confirmations");
        }

        self.db.upsert_report(&report).await?;
        Ok(report)
    }

    /// Admin status transition, restricted to the legal state machine.
    pub async fn update_status(
        &self,
        report_id: &str,
        next: ReportStatus,
        note: Option<String>,
    ) -> Result<Report> {
        let mut report = self
            .db
            .get_report(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))?;

        if !report.status.can_transition_to(next) {
            return Err(AppError::BadRequest(format!(
                "Cannot transition report from {:?} to {:?}",
                report.status, next
            )));
        }

        report.status = next;
        if let Some(note) = note {
            report.admin_notes.push(note);
        }

        self.db.upsert_report(&report).await?;
        tracing::info!(report_id = %report.id, status = ?next, "Report status updated");
        Ok(report)
    }

    /// List reports, newest first, with optional status/category filters.
    pub async fn list(
        &self,
        status: Option<&str>,
        category: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Report>> {
        self.db.list_reports(status, category, limit, offset).await
    }

    /// Get a single report.
    pub async fn get(&self, report_id: &str) -> Result<Report> {
        self.db
            .get_report(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))
    }
}
