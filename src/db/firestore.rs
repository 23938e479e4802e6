// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profiles + cumulative counters)
//! - Routes (cycling paths)
//! - Rides (lifecycle documents + active-ride markers)
//! - Reports, Reviews, Rewards
//!
//! Every operation touches a single document; the one cross-request invariant
//! (at most one active ride per user) rides on create-only document-ID
//! semantics in the `active_rides` collection rather than any transaction.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{ActiveRideMarker, Report, Review, Reward, Ride, Route, User};
use firestore::errors::FirestoreError;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Map a Firestore error from a create-only insert: an existing document with
/// the same ID is a Conflict, everything else a Database error.
fn map_insert_err(e: FirestoreError, conflict_msg: &str) -> AppError {
    match e {
        FirestoreError::DataConflictError(_) => AppError::Conflict(conflict_msg.to_string()),
        other => AppError::Database(other.to_string()),
    }
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Look up a user by email (unique).
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_string();
        let mut users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("email").eq(email.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(users.pop())
    }

    /// Create a user (fails with Conflict if the ID already exists).
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| map_insert_err(e, "User already exists"))?;
        Ok(())
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Route Operations ────────────────────────────────────────

    /// Get a route by ID.
    pub async fn get_route(&self, route_id: &str) -> Result<Option<Route>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ROUTES)
            .obj()
            .one(route_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a route.
    pub async fn upsert_route(&self, route: &Route) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ROUTES)
            .document_id(&route.id)
            .object(route)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List active routes with pagination, newest first, optionally filtered
    /// by difficulty.
    pub async fn list_routes(
        &self,
        difficulty: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Route>, AppError> {
        let difficulty = difficulty.map(str::to_string);
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ROUTES)
            .filter(move |q| {
                let mut conditions = vec![q.field("is_active").eq(true)];
                if let Some(difficulty) = &difficulty {
                    conditions.push(q.field("difficulty").eq(difficulty.clone()));
                }
                q.for_all(conditions)
            })
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .offset(offset)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count non-deleted routes authored by a user.
    pub async fn count_routes_by_creator(&self, user_id: &str) -> Result<u32, AppError> {
        let user_id = user_id.to_string();
        let routes: Vec<Route> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ROUTES)
            .filter(move |q| {
                q.for_all([
                    q.field("creator_id").eq(user_id.clone()),
                    q.field("is_active").eq(true),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(routes.len() as u32)
    }

    // ─── Ride Operations ─────────────────────────────────────────

    /// Get a ride by ID.
    pub async fn get_ride(&self, ride_id: &str) -> Result<Option<Ride>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::RIDES)
            .obj()
            .one(ride_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a ride.
    pub async fn upsert_ride(&self, ride: &Ride) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::RIDES)
            .document_id(&ride.id)
            .object(ride)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List a user's non-deleted rides, newest first.
    pub async fn list_rides_for_user(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Ride>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::RIDES)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("is_active").eq(true),
                ])
            })
            .order_by([(
                "started_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .offset(offset)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count completed, non-soft-deleted rides for a user.
    pub async fn count_completed_rides(&self, user_id: &str) -> Result<u32, AppError> {
        let user_id = user_id.to_string();
        let rides: Vec<Ride> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::RIDES)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("status").eq("completed"),
                    q.field("is_active").eq(true),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(rides.len() as u32)
    }

    // ─── Active-Ride Marker Operations ───────────────────────────

    /// Claim the active-ride slot for a user.
    ///
    /// Create-only write keyed by user ID: if the marker already exists the
    /// user has an active ride and this fails with Conflict. This is the
    /// authoritative guard for the at-most-one-active-ride invariant; the
    /// application-level pre-check only improves the error message.
    pub async fn claim_active_ride(&self, marker: &ActiveRideMarker) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::ACTIVE_RIDES)
            .document_id(&marker.user_id)
            .object(marker)
            .execute()
            .await
            .map_err(|e| map_insert_err(e, "User already has an active ride"))?;
        Ok(())
    }

    /// Get the active-ride marker for a user, if any.
    pub async fn get_active_ride_marker(
        &self,
        user_id: &str,
    ) -> Result<Option<ActiveRideMarker>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACTIVE_RIDES)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Release the active-ride slot (ride reached a terminal state).
    pub async fn release_active_ride(&self, user_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::ACTIVE_RIDES)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Report Operations ───────────────────────────────────────

    /// Get a report by ID.
    pub async fn get_report(&self, report_id: &str) -> Result<Option<Report>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::REPORTS)
            .obj()
            .one(report_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a report.
    pub async fn upsert_report(&self, report: &Report) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::REPORTS)
            .document_id(&report.id)
            .object(report)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List reports, newest first, optionally filtered by status and
    /// category.
    pub async fn list_reports(
        &self,
        status: Option<&str>,
        category: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Report>, AppError> {
        let status = status.map(str::to_string);
        let category = category.map(str::to_string);
        self.get_client()?
            .fluent()
            .select()
            .from(collections::REPORTS)
            .filter(move |q| {
                let mut conditions = vec![];
                if let Some(status) = &status {
                    conditions.push(q.field("status").eq(status.clone()));
                }
                if let Some(category) = &category {
                    conditions.push(q.field("category").eq(category.clone()));
                }
                q.for_all(conditions)
            })
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .offset(offset)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all reports authored by a user (reports are never soft-deleted).
    pub async fn count_reports_by_user(&self, user_id: &str) -> Result<u32, AppError> {
        let user_id = user_id.to_string();
        let reports: Vec<Report> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::REPORTS)
            .filter(move |q| q.field("reporter_id").eq(user_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(reports.len() as u32)
    }

    // ─── Review Operations ───────────────────────────────────────

    /// Get a review by its pair-scoped document ID.
    pub async fn get_review(&self, review_id: &str) -> Result<Option<Review>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::REVIEWS)
            .obj()
            .one(review_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a review; a second review for the same (route, reviewer) pair
    /// collides on document ID and fails with Conflict.
    pub async fn insert_review(&self, review: &Review) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::REVIEWS)
            .document_id(&review.id)
            .object(review)
            .execute()
            .await
            .map_err(|e| map_insert_err(e, "You have already reviewed this route"))?;
        Ok(())
    }

    /// Update an existing review.
    pub async fn upsert_review(&self, review: &Review) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::REVIEWS)
            .document_id(&review.id)
            .object(review)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a review (hard delete).
    pub async fn delete_review(&self, review_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::REVIEWS)
            .document_id(review_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All reviews for a route (rating recompute reads the full set).
    pub async fn list_reviews_for_route(&self, route_id: &str) -> Result<Vec<Review>, AppError> {
        let route_id = route_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::REVIEWS)
            .filter(move |q| q.field("route_id").eq(route_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all reviews authored by a user.
    pub async fn count_reviews_by_user(&self, user_id: &str) -> Result<u32, AppError> {
        let user_id = user_id.to_string();
        let reviews: Vec<Review> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::REVIEWS)
            .filter(move |q| q.field("reviewer_id").eq(user_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(reviews.len() as u32)
    }

    // ─── Reward Operations ───────────────────────────────────────

    /// Get a reward by ID.
    pub async fn get_reward(&self, reward_id: &str) -> Result<Option<Reward>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::REWARDS)
            .obj()
            .one(reward_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a reward definition.
    pub async fn upsert_reward(&self, reward: &Reward) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::REWARDS)
            .document_id(&reward.id)
            .object(reward)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All active reward definitions, in catalogue order.
    pub async fn list_active_rewards(&self) -> Result<Vec<Reward>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::REWARDS)
            .filter(|q| q.field("is_active").eq(true))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
