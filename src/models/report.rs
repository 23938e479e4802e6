//! Hazard report model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of distinct `resolved` confirmations that auto-resolves a report.
pub const AUTO_RESOLVE_CONFIRMATIONS: usize = 3;

/// Points awarded for submitting a report.
pub const REPORT_SUBMISSION_POINTS: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    Pothole,
    Debris,
    Construction,
    Traffic,
    PoorSurface,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Report status. Resolved and dismissed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Open,
    UnderReview,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    /// Whether moving to `next` is a legal transition.
    pub fn can_transition_to(self, next: ReportStatus) -> bool {
        use ReportStatus::*;
        matches!(
            (self, next),
            (Open, UnderReview) | (Open, Resolved) | (Open, Dismissed)
                | (UnderReview, Resolved)
                | (UnderReview, Dismissed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ReportStatus::Resolved | ReportStatus::Dismissed)
    }
}

/// A community confirmation of a report, at most one per confirming user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Confirmation {
    pub user_id: String,
    pub status: ConfirmationStatus,
    pub confirmed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    StillExists,
    Resolved,
}

/// A hazard report stored in Firestore. Reports are never soft-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Document ID (UUID v4)
    pub id: String,
    pub reporter_id: String,
    pub location: crate::models::Coordinate,
    pub description: String,
    pub category: ReportCategory,
    pub severity: Severity,
    pub status: ReportStatus,
    #[serde(default)]
    pub confirmations: Vec<Confirmation>,
    /// Audit trail appended by moderation and auto-resolution
    #[serde(default)]
    pub admin_notes: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// Upsert a confirmation for `user_id`, replacing any existing entry in
    /// place rather than appending a duplicate.
    pub fn upsert_confirmation(&mut self, confirmation: Confirmation) {
        if let Some(existing) = self
            .confirmations
            .iter_mut()
            .find(|c| c.user_id == confirmation.user_id)
        {
            *existing = confirmation;
        } else {
            self.confirmations.push(confirmation);
        }
    }

    /// Count of confirmations asserting the hazard is resolved.
    pub fn resolved_confirmation_count(&self) -> usize {
        self.confirmations
            .iter()
            .filter(|c| c.status == ConfirmationStatus::Resolved)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        use ReportStatus::*;
        assert!(Open.can_transition_to(UnderReview));
        assert!(Open.can_transition_to(Resolved));
        assert!(Open.can_transition_to(Dismissed));
        assert!(UnderReview.can_transition_to(Resolved));
        assert!(UnderReview.can_transition_to(Dismissed));
    }

    #[test]
    fn test_terminal_states_have_no_exit() {
        use ReportStatus::*;
        for next in [Open, UnderReview, Resolved, Dismissed] {
            assert!(!Resolved.can_transition_to(next));
            assert!(!Dismissed.can_transition_to(next));
        }
        assert!(!UnderReview.can_transition_to(Open));
    }

    #[test]
    fn test_upsert_replaces_existing_confirmation() {
        let mut report = Report {
            id: "r1".to_string(),
            reporter_id: "owner".to_string(),
            location: crate::models::Coordinate { lat: 0.0, lon: 0.0 },
            description: "glass on path".to_string(),
            category: ReportCategory::Debris,
            severity: Severity::Low,
            status: ReportStatus::Open,
            confirmations: vec![],
            admin_notes: vec![],
            created_at: chrono::Utc::now(),
        };

        let now = chrono::Utc::now();
        report.upsert_confirmation(Confirmation {
            user_id: "u1".to_string(),
            status: ConfirmationStatus::StillExists,
            confirmed_at: now,
        });
        report.upsert_confirmation(Confirmation {
            user_id: "u1".to_string(),
            status: ConfirmationStatus::Resolved,
            confirmed_at: now,
        });

        assert_eq!(report.confirmations.len(), 1);
        assert_eq!(report.resolved_confirmation_count(), 1);
    }
}
