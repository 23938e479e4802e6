// SPDX-License-Identifier: MIT

//! Registration and login.
//!
//! Passwords are hashed with PBKDF2-HMAC-SHA256; session tokens are 30-day
//! HS256 JWTs delivered both as a cookie and in the response body.

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE};
use crate::models::{User, UserRole};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use validator::Validate;

const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

// ─── Password Hashing ────────────────────────────────────────

/// Hash a password as `pbkdf2-sha256$<iterations>$<salt>$<hash>` (base64).
fn hash_password(password: &str) -> anyhow::Result<String> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| anyhow::anyhow!("Failed to generate salt"))?;

    let mut hash = [0u8; HASH_LEN];
    ring::pbkdf2::derive(
        ring::pbkdf2::PBKDF2_HMAC_SHA256,
        NonZeroU32::new(PBKDF2_ITERATIONS).expect("non-zero"),
        &salt,
        password.as_bytes(),
        &mut hash,
    );

    Ok(format!(
        "pbkdf2-sha256${}${}${}",
        PBKDF2_ITERATIONS,
        STANDARD.encode(salt),
        STANDARD.encode(hash)
    ))
}

/// Constant-time verification against a stored hash string.
fn verify_password(password: &str, stored: &str) -> bool {
    let parts: Vec<&str> = stored.split('$').collect();
    if parts.len() != 4 || parts[0] != "pbkdf2-sha256" {
        return false;
    }
    let Ok(iterations) = parts[1].parse::<u32>() else {
        return false;
    };
    let Some(iterations) = NonZeroU32::new(iterations) else {
        return false;
    };
    let (Ok(salt), Ok(hash)) = (STANDARD.decode(parts[2]), STANDARD.decode(parts[3])) else {
        return false;
    };

    ring::pbkdf2::verify(
        ring::pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &salt,
        password.as_bytes(),
        &hash,
    )
    .is_ok()
}

// ─── Handlers ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
}

#[derive(Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user_id: String,
    pub name: String,
    pub role: UserRole,
}

fn session_cookie(token: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Register a new cyclist account.
async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<RegisterPayload>,
) -> Result<(CookieJar, Json<super::ApiResponse<SessionResponse>>)> {
    payload.validate()?;

    let email = payload.email.trim().to_lowercase();
    if state.db.get_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email,
        password_hash: hash_password(&payload.password)?,
        name: payload.name.trim().to_string(),
        role: UserRole::Cyclist,
        total_distance: 0.0,
        total_points: 0,
        achievements: vec![],
        current_streak: 0,
        longest_streak: 0,
        last_ride_date: None,
        is_active: true,
        created_at: chrono::Utc::now(),
    };

    state.db.insert_user(&user).await?;
    tracing::info!(user_id = %user.id, "User registered");

    let token = create_jwt(&user.id, user.role, &state.config.jwt_signing_key)?;
    let jar = jar.add(session_cookie(&token));

    Ok((
        jar,
        super::ok(
            "Account created",
            SessionResponse {
                token,
                user_id: user.id,
                name: user.name,
                role: user.role,
            },
        ),
    ))
}

/// Log in with email and password.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<(CookieJar, Json<super::ApiResponse<SessionResponse>>)> {
    payload.validate()?;

    let email = payload.email.trim().to_lowercase();
    let user = state
        .db
        .get_user_by_email(&email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(AppError::Unauthorized);
    }
    // Deactivated accounts cannot authenticate.
    if !user.is_active {
        return Err(AppError::Unauthorized);
    }

    let token = create_jwt(&user.id, user.role, &state.config.jwt_signing_key)?;
    let jar = jar.add(session_cookie(&token));

    Ok((
        jar,
        super::ok(
            "Logged in",
            SessionResponse {
                token,
                user_id: user.id,
                name: user.name,
                role: user.role,
            },
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn test_password_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("anything", "not-a-hash"));
        assert!(!verify_password("anything", "pbkdf2-sha256$abc$!!$!!"));
    }
}
