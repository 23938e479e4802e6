//! Ride model: one user's traversal of one route.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kilograms of CO2 saved per kilometre ridden instead of driven.
pub const CO2_KG_PER_KM: f64 = 0.21;

/// Points awarded for completing a ride.
pub const RIDE_COMPLETION_POINTS: u64 = 50;

/// Ride state machine: `active` transitions to `completed` or `cancelled`,
/// both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    Active,
    Completed,
    Cancelled,
}

/// A ride stored in Firestore.
///
/// The trip metrics (`completed_at` through `points_earned`) are unset while
/// the ride is active and populated exactly once at completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    /// Document ID (UUID v4)
    pub id: String,
    pub user_id: String,
    pub route_id: String,
    pub status: RideStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Wall-clock minutes between start and completion
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    /// Copied from the route at completion
    #[serde(default)]
    pub distance_km: Option<f64>,
    /// distance × CO2_KG_PER_KM, rounded to 2 decimals
    #[serde(default)]
    pub co2_saved_kg: Option<f64>,
    #[serde(default)]
    pub points_earned: Option<u64>,
    /// Soft delete
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Marker document keyed by user ID in the `active_rides` collection.
///
/// Created with create-only semantics when a ride starts and deleted when it
/// reaches a terminal state; the document-ID uniqueness is the authoritative
/// guard for the at-most-one-active-ride invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveRideMarker {
    pub user_id: String,
    pub ride_id: String,
    pub started_at: DateTime<Utc>,
}
