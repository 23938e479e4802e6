//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ROUTES: &str = "routes";
    pub const RIDES: &str = "rides";
    /// Per-user active-ride markers (keyed by user_id)
    pub const ACTIVE_RIDES: &str = "active_rides";
    pub const REPORTS: &str = "reports";
    pub const REVIEWS: &str = "reviews";
    pub const REWARDS: &str = "rewards";
}
