//! Reward (achievement) definitions.

use serde::{Deserialize, Serialize};

/// What a reward's threshold is measured against.
///
/// Closed enum so a criteria kind unknown at compile time is caught at build
/// time; `Unknown` absorbs stored documents that predate a new variant and
/// never qualifies during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CriteriaKind {
    TotalDistance,
    RoutesCreated,
    ReportsSubmitted,
    ReviewsWritten,
    RidesCompleted,
    #[serde(other)]
    Unknown,
}

/// Declarative reward criteria: a stats field and a threshold it must reach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(rename = "type")]
    pub kind: CriteriaKind,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

/// A reward definition stored in Firestore.
///
/// Deactivated rewards are excluded from future evaluation, but users who
/// already earned them keep the achievement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    /// Document ID (UUID v4)
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub criteria: Criteria,
    pub points_awarded: u64,
    pub tier: RewardTier,
    /// User IDs that have earned this reward
    #[serde(default)]
    pub earned_by: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_kind_serde_names() {
        let json = serde_json::to_string(&CriteriaKind::TotalDistance).unwrap();
        assert_eq!(json, "\"totalDistance\"");

        let kind: CriteriaKind = serde_json::from_str("\"ridesCompleted\"").unwrap();
        assert_eq!(kind, CriteriaKind::RidesCompleted);
    }

    #[test]
    fn test_unknown_criteria_kind_deserializes() {
        // Stored data written by a newer deployment must still load.
        let kind: CriteriaKind = serde_json::from_str("\"nightRidesCompleted\"").unwrap();
        assert_eq!(kind, CriteriaKind::Unknown);
    }
}
