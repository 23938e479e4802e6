// SPDX-License-Identifier: MIT

//! End-to-end lifecycle tests against the Firestore emulator.
//!
//! Run with FIRESTORE_EMULATOR_HOST set; each test is skipped otherwise.
//! Documents use fresh UUIDs so tests are independent and re-runnable.

use chrono::Utc;
use pedalpath::error::AppError;
use pedalpath::models::{
    ConfirmationStatus, Coordinate, Criteria, CriteriaKind, Difficulty, ReportCategory,
    ReportStatus, Reward, RewardTier, RideStatus, Route, Severity, User, UserRole,
};
use pedalpath::AppState;
use std::sync::Arc;

mod common;

fn make_user() -> User {
    User {
        id: uuid::Uuid::new_v4().to_string(),
        email: format!("{}@example.com", uuid::Uuid::new_v4()),
        password_hash: "unused".to_string(),
        name: "Test Cyclist".to_string(),
        role: UserRole::Cyclist,
        total_distance: 0.0,
        total_points: 0,
        achievements: vec![],
        current_streak: 0,
        longest_streak: 0,
        last_ride_date: None,
        is_active: true,
        created_at: Utc::now(),
    }
}

fn make_route(creator_id: &str, distance_km: f64) -> Route {
    Route {
        id: uuid::Uuid::new_v4().to_string(),
        name: "Lakeside Loop".to_string(),
        description: None,
        creator_id: creator_id.to_string(),
        start: Coordinate {
            lat: 47.36,
            lon: 8.54,
        },
        end: Coordinate {
            lat: 47.37,
            lon: 8.55,
        },
        waypoints: vec![],
        distance_km,
        difficulty: Difficulty::Easy,
        average_rating: 0.0,
        review_count: 0,
        is_verified: false,
        is_active: true,
        created_at: Utc::now(),
    }
}

fn make_reward(kind: CriteriaKind, threshold: f64, points: u64) -> Reward {
    Reward {
        id: uuid::Uuid::new_v4().to_string(),
        name: "First Ride".to_string(),
        description: None,
        criteria: Criteria { kind, threshold },
        points_awarded: points,
        tier: RewardTier::Bronze,
        earned_by: vec![],
        is_active: true,
    }
}

async fn seed_user_and_route(state: &Arc<AppState>, distance_km: f64) -> (User, Route) {
    let user = make_user();
    let route = make_route(&user.id, distance_km);
    state.db.upsert_user(&user).await.unwrap();
    state.db.upsert_route(&route).await.unwrap();
    (user, route)
}

#[tokio::test]
async fn test_second_active_ride_conflicts() {
    require_emulator!();
    let state = common::create_emulator_app().await;
    let (user, route) = seed_user_and_route(&state, 5.0).await;

    let first = state.rides.start(&user.id, &route.id).await.unwrap();
    assert_eq!(first.status, RideStatus::Active);

    let err = state.rides.start(&user.id, &route.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Completing the first ride frees the slot
    state.rides.complete(&first.id, &user.id).await.unwrap();
    let second = state.rides.start(&user.id, &route.id).await.unwrap();
    assert_eq!(second.status, RideStatus::Active);
}

#[tokio::test]
async fn test_ride_completion_settles_metrics_and_counters() {
    require_emulator!();
    let state = common::create_emulator_app().await;
    let (user, route) = seed_user_and_route(&state, 5.5).await;

    let ride = state.rides.start(&user.id, &route.id).await.unwrap();
    let completed = state.rides.complete(&ride.id, &user.id).await.unwrap();

    assert_eq!(completed.status, RideStatus::Completed);
    assert_eq!(completed.distance_km, Some(5.5));
    assert_eq!(completed.co2_saved_kg, Some(1.16)); // 5.5 × 0.21 rounded
    assert_eq!(completed.points_earned, Some(50));
    assert!(completed.duration_minutes.unwrap() >= 0);

    let after = state.db.get_user(&user.id).await.unwrap().unwrap();
    assert_eq!(after.total_distance, 5.5);
    assert!(after.total_points >= 50);
    assert_eq!(after.current_streak, 1);

    // Completing again is an invalid transition
    let err = state.rides.complete(&ride.id, &user.id).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_completing_someone_elses_ride_is_forbidden() {
    require_emulator!();
    let state = common::create_emulator_app().await;
    let (user, route) = seed_user_and_route(&state, 5.0).await;
    let intruder = make_user();
    state.db.upsert_user(&intruder).await.unwrap();

    let ride = state.rides.start(&user.id, &route.id).await.unwrap();
    let err = state
        .rides
        .complete(&ride.id, &intruder.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_grant_check_is_idempotent() {
    require_emulator!();
    let state = common::create_emulator_app().await;
    let (user, route) = seed_user_and_route(&state, 5.0).await;

    let reward = make_reward(CriteriaKind::RidesCompleted, 1.0, 100);
    state.db.upsert_reward(&reward).await.unwrap();

    let ride = state.rides.start(&user.id, &route.id).await.unwrap();
    state.rides.complete(&ride.id, &user.id).await.unwrap();

    // Completion already ran a best-effort check; an explicit re-check
    // grants nothing new.
    let first = state.rewards.check_and_grant(&user.id).await.unwrap();
    let second = state.rewards.check_and_grant(&user.id).await.unwrap();

    assert!(second.granted.is_empty());
    assert_eq!(second.total_achievements, first.total_achievements);

    let after = state.db.get_user(&user.id).await.unwrap().unwrap();
    let earned = after.achievements.iter().filter(|a| **a == reward.id).count();
    assert_eq!(earned, 1, "reward must not be double-granted");
}

#[tokio::test]
async fn test_scenario_ride_completion_grants_first_ride_reward() {
    require_emulator!();
    let state = common::create_emulator_app().await;
    let (user, route) = seed_user_and_route(&state, 5.0).await;

    let reward = make_reward(CriteriaKind::RidesCompleted, 1.0, 100);
    state.db.upsert_reward(&reward).await.unwrap();

    let before = state.db.get_user(&user.id).await.unwrap().unwrap();
    let ride = state.rides.start(&user.id, &route.id).await.unwrap();
    state.rides.complete(&ride.id, &user.id).await.unwrap();

    let after = state.db.get_user(&user.id).await.unwrap().unwrap();
    assert_eq!(after.total_distance, before.total_distance + 5.0);
    // Ride bonus plus the reward's points
    assert_eq!(after.total_points, before.total_points + 50 + 100);
    assert!(after.achievements.contains(&reward.id));

    let stored = state.db.get_reward(&reward.id).await.unwrap().unwrap();
    assert!(stored.earned_by.contains(&user.id));
}

#[tokio::test]
async fn test_review_recompute_tracks_full_set() {
    require_emulator!();
    let state = common::create_emulator_app().await;
    let (_owner, route) = seed_user_and_route(&state, 8.0).await;
    let alice = make_user();
    let bob = make_user();
    state.db.upsert_user(&alice).await.unwrap();
    state.db.upsert_user(&bob).await.unwrap();

    state.reviews.create(&route.id, &alice.id, 4, None).await.unwrap();
    state.reviews.create(&route.id, &bob.id, 2, None).await.unwrap();

    let rated = state.db.get_route(&route.id).await.unwrap().unwrap();
    assert_eq!(rated.average_rating, 3.0);
    assert_eq!(rated.review_count, 2);

    // Duplicate review rejected
    let err = state
        .reviews
        .create(&route.id, &alice.id, 5, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Deleting one recomputes from the remaining set
    state
        .reviews
        .delete(&route.id, &bob.id, &bob.id, false)
        .await
        .unwrap();
    let rated = state.db.get_route(&route.id).await.unwrap().unwrap();
    assert_eq!(rated.average_rating, 4.0);
    assert_eq!(rated.review_count, 1);

    // Deleting all resets to zero
    state
        .reviews
        .delete(&route.id, &alice.id, &alice.id, false)
        .await
        .unwrap();
    let rated = state.db.get_route(&route.id).await.unwrap().unwrap();
    assert_eq!(rated.average_rating, 0.0);
    assert_eq!(rated.review_count, 0);
}

#[tokio::test]
async fn test_report_auto_resolves_after_three_confirmations() {
    require_emulator!();
    let state = common::create_emulator_app().await;
    let reporter = make_user();
    state.db.upsert_user(&reporter).await.unwrap();

    let report = state
        .reports
        .create(
            &reporter.id,
            Coordinate {
                lat: 47.0,
                lon: 8.0,
            },
            "Deep pothole on the bike lane".to_string(),
            ReportCategory::Pothole,
            Severity::High,
        )
        .await
        .unwrap();

    // Reporter cannot confirm their own report
    let err = state
        .reports
        .confirm(&report.id, &reporter.id, ConfirmationStatus::Resolved)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let confirmers: Vec<User> = (0..3).map(|_| make_user()).collect();
    for confirmer in &confirmers {
        state.db.upsert_user(confirmer).await.unwrap();
    }

    // A repeated confirmation by the same user updates in place
    state
        .reports
        .confirm(&report.id, &confirmers[0].id, ConfirmationStatus::StillExists)
        .await
        .unwrap();
    let updated = state
        .reports
        .confirm(&report.id, &confirmers[0].id, ConfirmationStatus::Resolved)
        .await
        .unwrap();
    assert_eq!(updated.confirmations.len(), 1);
    assert_eq!(updated.status, ReportStatus::Open);

    state
        .reports
        .confirm(&report.id, &confirmers[1].id, ConfirmationStatus::Resolved)
        .await
        .unwrap();
    let resolved = state
        .reports
        .confirm(&report.id, &confirmers[2].id, ConfirmationStatus::Resolved)
        .await
        .unwrap();

    assert_eq!(resolved.status, ReportStatus::Resolved);
    assert_eq!(resolved.confirmations.len(), 3);
    assert!(!resolved.admin_notes.is_empty(), "auto-resolve appends a note");

    // Terminal: no further confirmations
    let extra = make_user();
    state.db.upsert_user(&extra).await.unwrap();
    let err = state
        .reports
        .confirm(&report.id, &extra.id, ConfirmationStatus::Resolved)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}
