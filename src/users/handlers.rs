use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{UpdateUserRequest, UserUpdated};
use crate::auth::extract::{AdminIdentity, Identity};
use crate::auth::handlers::is_valid_email;
use crate::auth::password::hash_password;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::store::{StoreError, User, UserPatch};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/me/profile", get(my_profile))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

#[instrument(skip(state))]
async fn list_users(
    State(state): State<AppState>,
    AdminIdentity(_): AdminIdentity,
) -> ApiResult<Json<Vec<User>>> {
    let users = state.store.list_users().await?;
    Ok(Json(users))
}

/// Ownership is decided by id comparison before any lookup, so probing
/// another user's id as a non-admin always answers 403, present or not.
#[instrument(skip(state))]
async fn get_user(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    if !identity.can_access(id) {
        warn!(requester = %identity.id, target = %id, "cross-user profile read denied");
        return Err(ApiError::forbidden(
            "Access denied. You can only view your own profile.",
        ));
    }

    let user = state
        .store
        .user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
async fn update_user(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserUpdated>> {
    if !identity.can_access(id) {
        return Err(ApiError::forbidden(
            "Access denied. You can only update your own profile.",
        ));
    }

    let email = match payload.email {
        Some(email) => {
            let email = email.trim().to_lowercase();
            if !is_valid_email(&email) {
                return Err(ApiError::validation("Invalid email"));
            }
            Some(email)
        }
        None => None,
    };

    let password_hash = match payload.password.as_deref() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    // Role changes are admin-only; for everyone else the field is a no-op
    // while the rest of the patch still applies.
    let role = if identity.role.is_admin() {
        payload.role
    } else {
        None
    };

    let patch = UserPatch {
        name: payload.name,
        email,
        password_hash,
        role,
        registration_number: payload.registration_number,
        car_brand: payload.car_brand,
        car_model: payload.car_model,
        delivery_date: payload.delivery_date,
    };

    let user = state
        .store
        .update_user(id, patch)
        .await
        .map_err(|e| match e {
            StoreError::Duplicate("email") => ApiError::validation("Email already in use"),
            StoreError::Duplicate("registrationNumber") => {
                ApiError::validation("Registration number already in use")
            }
            other => other.into(),
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!(user_id = %user.id, "user updated");
    Ok(Json(UserUpdated {
        message: "User updated successfully",
        user,
    }))
}

#[instrument(skip(state))]
async fn delete_user(
    State(state): State<AppState>,
    AdminIdentity(identity): AdminIdentity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    if !state.store.delete_user(id).await? {
        return Err(ApiError::not_found("User not found"));
    }
    info!(user_id = %id, admin = %identity.id, "user deleted");
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

#[instrument(skip(state))]
async fn my_profile(State(state): State<AppState>, identity: Identity) -> ApiResult<Json<User>> {
    let user = state
        .store
        .user_by_id(identity.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user))
}
