//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User role for authorization checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Cyclist,
    Admin,
}

/// User profile stored in Firestore.
///
/// `total_distance`, `total_points` and the streak fields are cumulative
/// counters mutated by ride completion, review/report submission and reward
/// grants; they only ever increase (streaks excepted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Document ID (UUID v4)
    pub id: String,
    /// Unique email address
    pub email: String,
    /// PBKDF2 password hash (opaque, see middleware::auth)
    pub password_hash: String,
    /// Display name
    pub name: String,
    pub role: UserRole,
    /// Cumulative distance ridden (km), accumulated at ride completion
    #[serde(default)]
    pub total_distance: f64,
    /// Cumulative points from rides, reviews, reports and reward grants
    #[serde(default)]
    pub total_points: u64,
    /// Reward IDs earned by this user; a reward appears at most once
    #[serde(default)]
    pub achievements: Vec<String>,
    /// Consecutive-day ride streak as of `last_ride_date`
    #[serde(default)]
    pub current_streak: u32,
    /// Longest streak ever achieved
    #[serde(default)]
    pub longest_streak: u32,
    /// Anchor date for streak arithmetic; None before the first ride
    #[serde(default)]
    pub last_ride_date: Option<DateTime<Utc>>,
    /// Soft lifecycle flag; deactivated users cannot authenticate
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
