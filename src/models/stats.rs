//! Per-user statistics snapshot consumed by reward evaluation.

use serde::{Deserialize, Serialize};

use crate::models::CriteriaKind;

/// Cross-entity statistics for one user, computed on demand.
///
/// `total_distance` is read from the User record (accumulated at completion
/// time); the counts come from per-collection queries. Pure data, no identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStatsSnapshot {
    /// Cumulative distance ridden (km)
    pub total_distance: f64,
    /// Non-deleted routes authored by the user
    pub routes_created: u32,
    /// All reports authored by the user
    pub reports_submitted: u32,
    /// All reviews authored by the user
    pub reviews_written: u32,
    /// Completed, non-soft-deleted rides
    pub rides_completed: u32,
}

impl UserStatsSnapshot {
    /// The stats value a reward criteria kind is measured against.
    ///
    /// Returns None for `Unknown`, which therefore never qualifies.
    pub fn value_for(&self, kind: CriteriaKind) -> Option<f64> {
        match kind {
            CriteriaKind::TotalDistance => Some(self.total_distance),
            CriteriaKind::RoutesCreated => Some(self.routes_created as f64),
            CriteriaKind::ReportsSubmitted => Some(self.reports_submitted as f64),
            CriteriaKind::ReviewsWritten => Some(self.reviews_written as f64),
            CriteriaKind::RidesCompleted => Some(self.rides_completed as f64),
            CriteriaKind::Unknown => None,
        }
    }
}
