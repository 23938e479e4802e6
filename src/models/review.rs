//! Review model: one rating + comment per (route, reviewer) pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Points awarded for writing a review.
pub const REVIEW_SUBMISSION_POINTS: u64 = 10;

/// A review stored in Firestore.
///
/// The document ID is `{route_id}_{reviewer_id}`, so the one-review-per-pair
/// invariant is enforced by document-ID uniqueness at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub route_id: String,
    pub reviewer_id: String,
    /// Rating in 1..=5
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    /// Set once the comment or rating is edited after creation
    #[serde(default)]
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Deterministic document ID enforcing the unique (route, reviewer) pair.
    pub fn document_id(route_id: &str, reviewer_id: &str) -> String {
        format!("{}_{}", route_id, reviewer_id)
    }
}

/// Mean of `ratings`, rounded to 1 decimal; 0.0 for an empty set.
pub fn average_rating(ratings: &[u8]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: u32 = ratings.iter().map(|&r| r as u32).sum();
    let mean = sum as f64 / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_rating_rounds_to_one_decimal() {
        assert_eq!(average_rating(&[4, 2]), 3.0);
        assert_eq!(average_rating(&[5, 4, 4]), 4.3);
        assert_eq!(average_rating(&[1, 2]), 1.5);
    }

    #[test]
    fn test_average_rating_empty_is_zero() {
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn test_document_id_is_pair_scoped() {
        assert_eq!(Review::document_id("route1", "userA"), "route1_userA");
    }
}
