use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::error::ApiError;
use crate::store::Role;

/// Resolved identity of an authenticated request, attached by the auth gate
/// and passed to handlers as an explicit argument.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl Identity {
    /// The uniform authorization rule: admins reach everything, everyone
    /// else only what they own.
    pub fn can_access(&self, owner_id: Uuid) -> bool {
        self.role.is_admin() || self.id == owner_id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthenticated("No token provided"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthenticated("No token provided"))?;

        let claims = JwtKeys::from_ref(state).verify(token)?;

        Ok(Identity {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// Admin gate: authenticates like [`Identity`], then rejects with 403 unless
/// the caller's role is ADMIN.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AdminIdentity
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        if !identity.role.is_admin() {
            return Err(ApiError::forbidden(
                "Access denied. Admin privileges required.",
            ));
        }
        Ok(AdminIdentity(identity))
    }
}
