use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::{
    dto::{AuthResponse, LoginRequest, RegisterRequest},
    extract::Identity,
    jwt::JwtKeys,
    password::{hash_password, verify_password},
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::store::{NewUser, Role, StoreError, User};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    // Empty strings count as missing, like absent keys.
    let (Some(name), Some(email), Some(password)) = (
        payload.name.filter(|s| !s.is_empty()),
        payload.email.filter(|s| !s.is_empty()),
        payload.password.filter(|s| !s.is_empty()),
    ) else {
        warn!("registration with missing fields");
        return Err(ApiError::validation("Missing required fields"));
    };

    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }

    let password_hash = hash_password(&password)?;

    let user = state
        .store
        .create_user(NewUser {
            name,
            email,
            password_hash,
            role: Role::User,
            registration_number: payload.registration_number,
            car_brand: payload.car_brand,
            car_model: payload.car_model,
            delivery_date: payload.delivery_date,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate("email") => {
                ApiError::validation("User already exists with this email")
            }
            StoreError::Duplicate("registrationNumber") => {
                ApiError::validation("Registration number already in use")
            }
            other => other.into(),
        })?;

    let token = JwtKeys::from_ref(&state).sign(&user)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully",
            user,
            token,
        }),
    ))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (Some(email), Some(password)) = (
        payload.email.filter(|s| !s.is_empty()),
        payload.password.filter(|s| !s.is_empty()),
    ) else {
        warn!("login with missing fields");
        return Err(ApiError::validation("Missing required fields"));
    };
    let email = email.trim().to_lowercase();

    // Unknown email and wrong password answer identically so login attempts
    // cannot enumerate accounts.
    let Some(user) = state.store.user_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::unauthenticated("Invalid credentials"));
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthenticated("Invalid credentials"));
    }

    let token = JwtKeys::from_ref(&state).sign(&user)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        message: "Login successful",
        user,
        token,
    }))
}

#[instrument(skip(state))]
async fn me(State(state): State<AppState>, identity: Identity) -> ApiResult<Json<User>> {
    let user = state
        .store
        .user_by_id(identity.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user))
}
