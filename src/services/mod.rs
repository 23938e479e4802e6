//! Business logic services.

pub mod external;
pub mod report;
pub mod review;
pub mod rewards;
pub mod ride;
pub mod stats;
pub mod streak;

pub use external::{RoutingService, WeatherService};
pub use report::ReportService;
pub use review::ReviewService;
pub use rewards::RewardEngine;
pub use ride::RideService;
pub use stats::StatsService;
