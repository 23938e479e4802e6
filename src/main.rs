// SPDX-License-Identifier: MIT

//! PedalPath API Server
//!
//! Community cycling platform: ride logging, route sharing, hazard reports,
//! and gamified rewards.

use pedalpath::{config::Config, db::FirestoreDb, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting PedalPath API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    if config.routing_api_key.is_none() {
        tracing::warn!("ROUTING_API_KEY not set; route distances use straight-line estimates");
    }
    if config.weather_api_key.is_none() {
        tracing::warn!("WEATHER_API_KEY not set; weather endpoint disabled");
    }

    // Build shared state and router
    let port = config.port;
    let state = Arc::new(AppState::new(config, db));
    let app = pedalpath::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pedalpath=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
