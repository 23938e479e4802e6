// SPDX-License-Identifier: MIT

//! Reward evaluation and granting.
//!
//! The evaluator is a pure function over a stats snapshot and the reward
//! catalogue; the grant engine orchestrates fetch → evaluate → persist and is
//! idempotent through the achievement-set membership pre-check.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{CriteriaKind, Reward, UserStatsSnapshot};
use crate::services::StatsService;

/// Outcome of a grant check.
#[derive(Debug)]
pub struct GrantOutcome {
    /// Rewards newly granted by this call, in catalogue order
    pub granted: Vec<Reward>,
    /// The user's total achievement count after granting
    pub total_achievements: usize,
}

/// Select the candidates whose criteria the stats satisfy.
///
/// A reward qualifies iff the stats field named by its criteria kind has
/// reached the threshold. An `Unknown` kind (stored data newer than this
/// build) never qualifies; that is forward compatibility, not an error, but
/// it is logged so operators notice a stale deployment.
pub fn evaluate<'a>(stats: &UserStatsSnapshot, candidates: &'a [Reward]) -> Vec<&'a Reward> {
    candidates
        .iter()
        .filter(|reward| {
            if reward.criteria.kind == CriteriaKind::Unknown {
                tracing::warn!(
                    reward_id = %reward.id,
                    "Reward has an unrecognized criteria type; skipping"
                );
                return false;
            }
            match stats.value_for(reward.criteria.kind) {
                Some(value) => value >= reward.criteria.threshold,
                None => false,
            }
        })
        .collect()
}

/// Orchestrates reward evaluation and persistence.
#[derive(Clone)]
pub struct RewardEngine {
    db: FirestoreDb,
    stats: StatsService,
}

impl RewardEngine {
    pub fn new(db: FirestoreDb, stats: StatsService) -> Self {
        Self { db, stats }
    }

    /// Evaluate all active rewards for a user and grant those newly earned.
    ///
    /// For each grant: the reward ID joins the user's achievement set, the
    /// reward's points are added to the user's total, and the user ID joins
    /// the reward's earned-by set (persisted per reward). The user document
    /// is written once after the loop, and only if something was granted.
    ///
    /// Calling this twice with no intervening activity grants nothing the
    /// second time; the membership pre-check is the idempotence guard.
    pub async fn check_and_grant(&self, user_id: &str) -> Result<GrantOutcome> {
        let mut user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let stats = self.stats.compute_user_stats(user_id).await?;
        let rewards = self.db.list_active_rewards().await?;

        // Rewards already earned are not candidates; this is what makes the
        // whole check idempotent.
        let candidates: Vec<Reward> = rewards
            .into_iter()
            .filter(|r| !user.achievements.contains(&r.id))
            .collect();

        let satisfied: Vec<Reward> = evaluate(&stats, &candidates).into_iter().cloned().collect();

        let mut granted = Vec::with_capacity(satisfied.len());
        for mut reward in satisfied {
            user.achievements.push(reward.id.clone());
            user.total_points += reward.points_awarded;

            if !reward.earned_by.contains(&user.id) {
                reward.earned_by.push(user.id.clone());
            }
            self.db.upsert_reward(&reward).await?;

            tracing::info!(
                user_id = %user.id,
                reward_id = %reward.id,
                reward = %reward.name,
                points = reward.points_awarded,
                "Reward granted"
            );
            granted.push(reward);
        }

        if !granted.is_empty() {
            self.db.upsert_user(&user).await?;
        }

        Ok(GrantOutcome {
            granted,
            total_achievements: user.achievements.len(),
        })
    }

    /// Fire-and-log variant used when granting is a side effect of another
    /// operation (ride completion, review/report creation).
    ///
    /// This is the single place where the core deliberately swallows an
    /// error: the triggering operation has already succeeded and must not be
    /// rolled back because evaluation failed.
    pub async fn check_and_grant_best_effort(&self, user_id: &str) {
        if let Err(e) = self.check_and_grant(user_id).await {
            tracing::warn!(user_id, error = %e, "Reward check failed; continuing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Criteria, RewardTier};

    fn reward(id: &str, kind: CriteriaKind, threshold: f64) -> Reward {
        Reward {
            id: id.to_string(),
            name: format!("Reward {}", id),
            description: None,
            criteria: Criteria { kind, threshold },
            points_awarded: 100,
            tier: RewardTier::Bronze,
            earned_by: vec![],
            is_active: true,
        }
    }

    fn stats() -> UserStatsSnapshot {
        UserStatsSnapshot {
            total_distance: 120.5,
            routes_created: 3,
            reports_submitted: 1,
            reviews_written: 0,
            rides_completed: 12,
        }
    }

    #[test]
    fn test_threshold_met_qualifies() {
        let rewards = vec![reward("a", CriteriaKind::RidesCompleted, 10.0)];
        let satisfied = evaluate(&stats(), &rewards);
        assert_eq!(satisfied.len(), 1);
        assert_eq!(satisfied[0].id, "a");
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let rewards = vec![reward("a", CriteriaKind::RidesCompleted, 12.0)];
        assert_eq!(evaluate(&stats(), &rewards).len(), 1);
    }

    #[test]
    fn test_threshold_not_met_does_not_qualify() {
        let rewards = vec![
            reward("a", CriteriaKind::ReviewsWritten, 1.0),
            reward("b", CriteriaKind::TotalDistance, 500.0),
        ];
        assert!(evaluate(&stats(), &rewards).is_empty());
    }

    #[test]
    fn test_distance_criteria_uses_fractional_km() {
        let rewards = vec![reward("a", CriteriaKind::TotalDistance, 120.5)];
        assert_eq!(evaluate(&stats(), &rewards).len(), 1);
    }

    #[test]
    fn test_unknown_kind_never_qualifies() {
        let rewards = vec![reward("a", CriteriaKind::Unknown, 0.0)];
        assert!(evaluate(&stats(), &rewards).is_empty());
    }

    #[test]
    fn test_mixed_catalogue_preserves_order() {
        let rewards = vec![
            reward("first", CriteriaKind::RidesCompleted, 1.0),
            reward("skip", CriteriaKind::ReviewsWritten, 5.0),
            reward("second", CriteriaKind::RoutesCreated, 3.0),
        ];
        let satisfied = evaluate(&stats(), &rewards);
        let ids: Vec<&str> = satisfied.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }
}
