// SPDX-License-Identifier: MIT

//! PedalPath: community cycling platform backend.
//!
//! This crate provides the REST API for logging rides, sharing routes,
//! reporting hazards, and earning gamified rewards.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{
    ReportService, ReviewService, RewardEngine, RideService, RoutingService, StatsService,
    WeatherService,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub rewards: RewardEngine,
    pub rides: RideService,
    pub reviews: ReviewService,
    pub reports: ReportService,
    pub routing: RoutingService,
    pub weather: WeatherService,
}

impl AppState {
    /// Wire up all services around one database handle.
    pub fn new(config: Config, db: FirestoreDb) -> Self {
        let stats = StatsService::new(db.clone());
        let rewards = RewardEngine::new(db.clone(), stats);
        let rides = RideService::new(db.clone(), rewards.clone());
        let reviews = ReviewService::new(db.clone(), rewards.clone());
        let reports = ReportService::new(db.clone(), rewards.clone());
        let routing = RoutingService::new(config.routing_api_key.clone());
        let weather = WeatherService::new(config.weather_api_key.clone());

        Self {
            config,
            db,
            rewards,
            rides,
            reviews,
            reports,
            routing,
            weather,
        }
    }
}
