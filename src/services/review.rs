// SPDX-License-Identifier: MIT

//! Review service: one review per (route, reviewer), with the owning route's
//! derived rating fields recomputed on every mutation.

use chrono::Utc;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::review::{average_rating, REVIEW_SUBMISSION_POINTS};
use crate::models::Review;
use crate::services::RewardEngine;

#[derive(Clone)]
pub struct ReviewService {
    db: FirestoreDb,
    rewards: RewardEngine,
}

impl ReviewService {
    pub fn new(db: FirestoreDb, rewards: RewardEngine) -> Self {
        Self { db, rewards }
    }

    /// Create a review for a route.
    ///
    /// The document ID is pair-scoped, so a duplicate review by the same
    /// reviewer fails with Conflict at the insert. Awards submission points
    /// and triggers a best-effort reward check.
    pub async fn create(
        &self,
        route_id: &str,
        reviewer_id: &str,
        rating: u8,
        comment: Option<String>,
    ) -> Result<Review> {
        let route = self
            .db
            .get_route(route_id)
            .await?
            .filter(|r| r.is_active)
            .ok_or_else(|| AppError::NotFound(format!("Route {} not found", route_id)))?;

        let review = Review {
            id: Review::document_id(&route.id, reviewer_id),
            route_id: route.id.clone(),
            reviewer_id: reviewer_id.to_string(),
            rating,
            comment,
            is_edited: false,
            created_at: Utc::now(),
        };

        self.db.insert_review(&review).await?;
        self.recompute_route_rating(&route.id).await?;

        if let Some(mut user) = self.db.get_user(reviewer_id).await? {
            user.total_points += REVIEW_SUBMISSION_POINTS;
            self.db.upsert_user(&user).await?;
        }

        tracing::info!(route_id = %route.id, reviewer_id, rating, "Review created");

        self.rewards.check_and_grant_best_effort(reviewer_id).await;

        Ok(review)
    }

    /// Update the requester's own review; marks it edited.
    pub async fn update(
        &self,
        route_id: &str,
        requester_id: &str,
        rating: Option<u8>,
        comment: Option<String>,
    ) -> Result<Review> {
        let review_id = Review::document_id(route_id, requester_id);
        let mut review = self
            .db
            .get_review(&review_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

        if let Some(rating) = rating {
            review.rating = rating;
        }
        if comment.is_some() {
            review.comment = comment;
        }
        review.is_edited = true;

        self.db.upsert_review(&review).await?;
        self.recompute_route_rating(route_id).await?;

        Ok(review)
    }

    /// Delete a review (own review, or any review for an admin).
    pub async fn delete(
        &self,
        route_id: &str,
        reviewer_id: &str,
        requester_id: &str,
        requester_is_admin: bool,
    ) -> Result<()> {
        if reviewer_id != requester_id && !requester_is_admin {
            return Err(AppError::Forbidden(
                "Review belongs to another user".to_string(),
            ));
        }

        let review_id = Review::document_id(route_id, reviewer_id);
        if self.db.get_review(&review_id).await?.is_none() {
            return Err(AppError::NotFound("Review not found".to_string()));
        }

        self.db.delete_review(&review_id).await?;
        self.recompute_route_rating(route_id).await?;

        tracing::info!(route_id, reviewer_id, "Review deleted");
        Ok(())
    }

    /// All reviews for a route.
    pub async fn list_for_route(&self, route_id: &str) -> Result<Vec<Review>> {
        self.db.list_reviews_for_route(route_id).await
    }

    /// Recalculate the route's `average_rating` and `review_count` from the
    /// full review set. Zero reviews resets the rating to 0.0.
    async fn recompute_route_rating(&self, route_id: &str) -> Result<()> {
        let reviews = self.db.list_reviews_for_route(route_id).await?;
        let ratings: Vec<u8> = reviews.iter().map(|r| r.rating).collect();

        let Some(mut route) = self.db.get_route(route_id).await? else {
            // Route hard-missing; nothing to update.
            return Ok(());
        };
        route.average_rating = average_rating(&ratings);
        route.review_count = ratings.len() as u32;
        self.db.upsert_route(&route).await
    }
}
