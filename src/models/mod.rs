//! Data models for storage and API.

pub mod report;
pub mod review;
pub mod reward;
pub mod ride;
pub mod route;
pub mod stats;
pub mod user;

pub use report::{Confirmation, ConfirmationStatus, Report, ReportCategory, ReportStatus, Severity};
pub use review::Review;
pub use reward::{Criteria, CriteriaKind, Reward, RewardTier};
pub use ride::{ActiveRideMarker, Ride, RideStatus};
pub use route::{Coordinate, Difficulty, Route};
pub use stats::UserStatsSnapshot;
pub use user::{User, UserRole};
