//! Cycling route model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Route difficulty rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
    Expert,
}

/// A cycling route stored in Firestore.
///
/// `average_rating` and `review_count` are derived from the route's reviews
/// and are only ever written by the rating recompute in the review service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Document ID (UUID v4)
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// User ID of the route's creator
    pub creator_id: String,
    pub start: Coordinate,
    pub end: Coordinate,
    #[serde(default)]
    pub waypoints: Vec<Coordinate>,
    /// Route length (km), from the routing service or a straight-line estimate
    pub distance_km: f64,
    pub difficulty: Difficulty,
    /// Mean review rating, rounded to 1 decimal; 0.0 with no reviews
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub review_count: u32,
    /// Admin-only verification flag
    #[serde(default)]
    pub is_verified: bool,
    /// Soft delete; inactive routes are excluded from lists and aggregates
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}
