// SPDX-License-Identifier: MIT

//! Ride lifecycle: start → complete | cancel.
//!
//! Completion is the one place trip metrics are computed and the one trigger
//! for streak updates; both feed the reward engine as a best-effort side
//! effect.

use chrono::Utc;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::ride::{CO2_KG_PER_KM, RIDE_COMPLETION_POINTS};
use crate::models::{ActiveRideMarker, Ride, RideStatus};
use crate::services::streak::{display_streak, update_streak};
use crate::services::RewardEngine;

/// Round to 2 decimal places (CO2 figures).
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Read-only ride statistics for a user.
#[derive(Debug, serde::Serialize)]
pub struct RideStats {
    pub rides_completed: u32,
    pub total_distance_km: f64,
    pub total_co2_saved_kg: f64,
    pub total_points: u64,
    /// Decayed for display; zero if more than a day has passed since riding
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Ride lifecycle service.
#[derive(Clone)]
pub struct RideService {
    db: FirestoreDb,
    rewards: RewardEngine,
}

impl RideService {
    pub fn new(db: FirestoreDb, rewards: RewardEngine) -> Self {
        Self { db, rewards }
    }

    /// Start a ride on a route.
    ///
    /// Fails NotFound if the route is missing or soft-deleted, Conflict if
    /// the user already has an active ride. The check-then-create window is
    /// closed by the create-only marker document in `active_rides`.
    pub async fn start(&self, user_id: &str, route_id: &str) -> Result<Ride> {
        let route = self
            .db
            .get_route(route_id)
            .await?
            .filter(|r| r.is_active)
            .ok_or_else(|| AppError::NotFound(format!("Route {} not found", route_id)))?;

        if self.db.get_active_ride_marker(user_id).await?.is_some() {
            return Err(AppError::Conflict(
                "User already has an active ride".to_string(),
            ));
        }

        let now = Utc::now();
        let ride = Ride {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            route_id: route.id.clone(),
            status: RideStatus::Active,
            started_at: now,
            completed_at: None,
            duration_minutes: None,
            distance_km: None,
            co2_saved_kg: None,
            points_earned: None,
            is_active: true,
        };

        // Authoritative uniqueness guard: create-only, keyed by user ID.
        self.db
            .claim_active_ride(&ActiveRideMarker {
                user_id: user_id.to_string(),
                ride_id: ride.id.clone(),
                started_at: now,
            })
            .await?;

        if let Err(e) = self.db.upsert_ride(&ride).await {
            // Don't leave a marker pointing at a ride that was never written.
            let _ = self.db.release_active_ride(user_id).await;
            return Err(e);
        }

        tracing::info!(user_id, route_id, ride_id = %ride.id, "Ride started");
        Ok(ride)
    }

    /// Complete an active ride and settle its metrics.
    pub async fn complete(&self, ride_id: &str, requester_id: &str) -> Result<Ride> {
        let mut ride = self.get_owned_active_state(ride_id, requester_id).await?;

        if ride.status != RideStatus::Active {
            return Err(AppError::BadRequest(
                "Only an active ride can be completed".to_string(),
            ));
        }

        // Soft-deleted routes stay addressable by ID for rides that
        // reference them, so no is_active filter here.
        let route = self
            .db
            .get_route(&ride.route_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Route {} not found", ride.route_id)))?;

        let now = Utc::now();
        let duration_minutes = (now - ride.started_at).num_minutes().max(0);
        let distance_km = route.distance_km;

        ride.status = RideStatus::Completed;
        ride.completed_at = Some(now);
        ride.duration_minutes = Some(duration_minutes);
        ride.distance_km = Some(distance_km);
        ride.co2_saved_kg = Some(round2(distance_km * CO2_KG_PER_KM));
        ride.points_earned = Some(RIDE_COMPLETION_POINTS);

        self.db.upsert_ride(&ride).await?;
        self.db.release_active_ride(&ride.user_id).await?;

        // Settle the user's counters and streak in one read-modify-write.
        if let Some(mut user) = self.db.get_user(&ride.user_id).await? {
            user.total_distance += distance_km;
            user.total_points += RIDE_COMPLETION_POINTS;

            let streak = update_streak(
                user.last_ride_date,
                user.current_streak,
                user.longest_streak,
                now,
            );
            user.current_streak = streak.current_streak;
            user.longest_streak = streak.longest_streak;
            user.last_ride_date = Some(streak.last_ride_date);

            self.db.upsert_user(&user).await?;
        }

        tracing::info!(
            ride_id = %ride.id,
            user_id = %ride.user_id,
            distance_km,
            duration_minutes,
            "Ride completed"
        );

        // Best-effort: a grant failure never fails the completion.
        self.rewards
            .check_and_grant_best_effort(&ride.user_id)
            .await;

        Ok(ride)
    }

    /// Cancel an active ride. No metrics, no points.
    pub async fn cancel(&self, ride_id: &str, requester_id: &str) -> Result<Ride> {
        let mut ride = self.get_owned_active_state(ride_id, requester_id).await?;

        if ride.status != RideStatus::Active {
            return Err(AppError::BadRequest(
                "Only an active ride can be cancelled".to_string(),
            ));
        }

        ride.status = RideStatus::Cancelled;
        self.db.upsert_ride(&ride).await?;
        self.db.release_active_ride(&ride.user_id).await?;

        tracing::info!(ride_id = %ride.id, user_id = %ride.user_id, "Ride cancelled");
        Ok(ride)
    }

    /// Load a ride, enforcing existence, soft-delete and ownership.
    async fn get_owned_active_state(&self, ride_id: &str, requester_id: &str) -> Result<Ride> {
        let ride = self
            .db
            .get_ride(ride_id)
            .await?
            .filter(|r| r.is_active)
            .ok_or_else(|| AppError::NotFound(format!("Ride {} not found", ride_id)))?;

        if ride.user_id != requester_id {
            return Err(AppError::Forbidden(
                "Ride belongs to another user".to_string(),
            ));
        }
        Ok(ride)
    }

    /// The user's current active ride, if any.
    pub async fn active_ride(&self, user_id: &str) -> Result<Option<Ride>> {
        match self.db.get_active_ride_marker(user_id).await? {
            Some(marker) => self.db.get_ride(&marker.ride_id).await,
            None => Ok(None),
        }
    }

    /// List a user's rides, newest first.
    pub async fn list(&self, user_id: &str, limit: u32, offset: u32) -> Result<Vec<Ride>> {
        self.db.list_rides_for_user(user_id, limit, offset).await
    }

    /// Read-only ride statistics with the display-time streak decay applied.
    pub async fn ride_stats(&self, user_id: &str) -> Result<RideStats> {
        let user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let rides_completed = self.db.count_completed_rides(user_id).await?;

        Ok(RideStats {
            rides_completed,
            total_distance_km: user.total_distance,
            total_co2_saved_kg: round2(user.total_distance * CO2_KG_PER_KM),
            total_points: user.total_points,
            current_streak: display_streak(user.last_ride_date, user.current_streak, Utc::now()),
            longest_streak: user.longest_streak,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_for_co2() {
        assert_eq!(round2(5.5 * CO2_KG_PER_KM), 1.16);
        assert_eq!(round2(10.0 * CO2_KG_PER_KM), 2.1);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_completion_bonus_is_fixed() {
        assert_eq!(RIDE_COMPLETION_POINTS, 50);
    }
}
