// SPDX-License-Identifier: MIT

//! Outbound routing and weather lookups.
//!
//! Both clients carry a fixed 10 second timeout. Routing failures (or a
//! missing key) degrade to a straight-line estimate; the weather inquiry
//! endpoint surfaces a clear "not configured" error instead.

use std::time::Duration;

use geo::{Distance, Haversine, Point};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::Coordinate;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const ROUTING_BASE_URL: &str = "https://api.openrouteservice.org/v2/directions/cycling-regular";
const WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Straight-line distance (km) along start → waypoints → end.
///
/// Used whenever the routing service cannot be reached; a lower bound on the
/// real route length, but good enough for a preview.
pub fn straight_line_distance_km(start: Coordinate, end: Coordinate, waypoints: &[Coordinate]) -> f64 {
    let mut points = Vec::with_capacity(waypoints.len() + 2);
    points.push(start);
    points.extend_from_slice(waypoints);
    points.push(end);

    let meters: f64 = points
        .windows(2)
        .map(|pair| {
            Haversine.distance(
                Point::new(pair[0].lon, pair[0].lat),
                Point::new(pair[1].lon, pair[1].lat),
            )
        })
        .sum();
    meters / 1000.0
}

#[derive(Deserialize)]
struct RoutingResponse {
    routes: Vec<RoutingRoute>,
}

#[derive(Deserialize)]
struct RoutingRoute {
    summary: RoutingSummary,
}

#[derive(Deserialize)]
struct RoutingSummary {
    /// Meters
    distance: f64,
}

/// Cycling-route distance lookup with straight-line fallback.
#[derive(Clone)]
pub struct RoutingService {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl RoutingService {
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client, api_key }
    }

    /// Route distance in km.
    ///
    /// Never fails: a missing key, a timeout, or a service error all fall
    /// back to the straight-line estimate so route creation keeps working.
    pub async fn route_distance_km(
        &self,
        start: Coordinate,
        end: Coordinate,
        waypoints: &[Coordinate],
    ) -> f64 {
        let Some(api_key) = &self.api_key else {
            tracing::debug!("No routing API key configured; using straight-line estimate");
            return straight_line_distance_km(start, end, waypoints);
        };

        match self.query_routing(api_key, start, end, waypoints).await {
            Ok(km) => km,
            Err(e) => {
                tracing::warn!(error = %e, "Routing service failed; falling back to straight-line estimate");
                straight_line_distance_km(start, end, waypoints)
            }
        }
    }

    async fn query_routing(
        &self,
        api_key: &str,
        start: Coordinate,
        end: Coordinate,
        waypoints: &[Coordinate],
    ) -> Result<f64> {
        let mut coordinates: Vec<[f64; 2]> = Vec::with_capacity(waypoints.len() + 2);
        coordinates.push([start.lon, start.lat]);
        coordinates.extend(waypoints.iter().map(|w| [w.lon, w.lat]));
        coordinates.push([end.lon, end.lat]);

        let response = self
            .client
            .post(ROUTING_BASE_URL)
            .header("Authorization", api_key)
            .json(&serde_json::json!({ "coordinates": coordinates }))
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Routing request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Routing service returned {}",
                response.status()
            )));
        }

        let body: RoutingResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Invalid routing response: {}", e)))?;

        body.routes
            .first()
            .map(|r| r.summary.distance / 1000.0)
            .ok_or_else(|| AppError::ExternalService("Routing response had no routes".to_string()))
    }
}

/// Current weather conditions at a point.
#[derive(Debug, serde::Serialize)]
pub struct WeatherConditions {
    pub description: String,
    pub temperature_c: f64,
    pub wind_speed_ms: f64,
}

#[derive(Deserialize)]
struct WeatherResponse {
    weather: Vec<WeatherEntry>,
    main: WeatherMain,
    wind: WeatherWind,
}

#[derive(Deserialize)]
struct WeatherEntry {
    description: String,
}

#[derive(Deserialize)]
struct WeatherMain {
    temp: f64,
}

#[derive(Deserialize)]
struct WeatherWind {
    speed: f64,
}

/// Read-only weather inquiry client.
#[derive(Clone)]
pub struct WeatherService {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl WeatherService {
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client, api_key }
    }

    /// Current conditions at a coordinate.
    ///
    /// Unlike the routing fallback, this is a user-facing inquiry endpoint:
    /// a missing key surfaces as a clear "not configured" error.
    pub async fn current_conditions(&self, location: Coordinate) -> Result<WeatherConditions> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            AppError::ExternalService("Weather service not configured".to_string())
        })?;

        let response = self
            .client
            .get(WEATHER_BASE_URL)
            .query(&[
                ("lat", location.lat.to_string()),
                ("lon", location.lon.to_string()),
                ("units", "metric".to_string()),
                ("appid", api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Weather request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Weather service returned {}",
                response.status()
            )));
        }

        let body: WeatherResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Invalid weather response: {}", e)))?;

        Ok(WeatherConditions {
            description: body
                .weather
                .first()
                .map(|w| w.description.clone())
                .unwrap_or_else(|| "unknown".to_string()),
            temperature_c: body.main.temp,
            wind_speed_ms: body.wind.speed,
        })
    }
}
