// SPDX-License-Identifier: MIT

//! Per-user statistics aggregation across collections.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::UserStatsSnapshot;

/// Computes the cross-entity statistics snapshot reward evaluation runs
/// against. Read-only; no side effects.
#[derive(Clone)]
pub struct StatsService {
    db: FirestoreDb,
}

impl StatsService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Aggregate a user's statistics.
    ///
    /// `total_distance` comes from the User record, accumulated at ride
    /// completion; the remaining fields are per-collection counts. Fails with
    /// NotFound if the user does not exist.
    pub async fn compute_user_stats(&self, user_id: &str) -> Result<UserStatsSnapshot> {
        let user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let (routes_created, reports_submitted, reviews_written, rides_completed) = tokio::try_join!(
            self.db.count_routes_by_creator(user_id),
            self.db.count_reports_by_user(user_id),
            self.db.count_reviews_by_user(user_id),
            self.db.count_completed_rides(user_id),
        )?;

        Ok(UserStatsSnapshot {
            total_distance: user.total_distance,
            routes_created,
            reports_submitted,
            reviews_written,
            rides_completed,
        })
    }
}
