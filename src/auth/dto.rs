use serde::Deserialize;
use time::OffsetDateTime;

use crate::store::User;

/// Request body for user registration. Required fields are checked by the
/// handler so the client gets a 400 instead of a deserialization error.
/// A client-supplied `role` is deliberately not accepted: everyone starts
/// as USER and only an admin update can promote.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub registration_number: Option<String>,
    pub car_brand: Option<String>,
    pub car_model: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub delivery_date: Option<OffsetDateTime>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response returned after register or login.
#[derive(Debug, serde::Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: User,
    pub token: String,
}
