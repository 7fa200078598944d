use serde::Deserialize;
use time::OffsetDateTime;

use crate::store::{Role, User};

/// Partial user update. Absent fields keep their stored values. `role` is
/// accepted here but only applied when the requester is an admin.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub registration_number: Option<String>,
    pub car_brand: Option<String>,
    pub car_model: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub delivery_date: Option<OffsetDateTime>,
    pub role: Option<Role>,
}

#[derive(Debug, serde::Serialize)]
pub struct UserUpdated {
    pub message: &'static str,
    pub user: User,
}
