use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Coarse permission level stored on the user record and embedded in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "TEXT", rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// User record. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub registration_number: Option<String>,
    pub car_brand: Option<String>,
    pub car_model: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub delivery_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Incident report, owned by exactly one user.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: Uuid,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Owner summary attached to incidents in admin views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReporterInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub registration_number: Option<String>,
    pub car_brand: Option<String>,
    pub car_model: Option<String>,
}

impl From<&User> for ReporterInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            registration_number: user.registration_number.clone(),
            car_brand: user.car_brand.clone(),
            car_model: user.car_model.clone(),
        }
    }
}

/// Incident joined with its reporter.
#[derive(Debug, Clone, Serialize)]
pub struct IncidentWithReporter {
    #[serde(flatten)]
    pub incident: Incident,
    pub user: ReporterInfo,
}

/// Values for a user insert. Uniqueness of email and registration number is
/// enforced by the store at write time.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub registration_number: Option<String>,
    pub car_brand: Option<String>,
    pub car_model: Option<String>,
    pub delivery_date: Option<OffsetDateTime>,
}

/// Partial user update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub registration_number: Option<String>,
    pub car_brand: Option<String>,
    pub car_model: Option<String>,
    pub delivery_date: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewIncident {
    pub description: String,
    pub date: OffsetDateTime,
    pub user_id: Uuid,
}

/// Partial incident update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct IncidentPatch {
    pub description: Option<String>,
    pub date: Option<OffsetDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Test".into(),
            email: "test@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::User,
            registration_number: Some("1234 BCD".into()),
            car_brand: None,
            car_model: None,
            delivery_date: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password"));
        assert!(json.contains("registrationNumber"));
        assert!(json.contains("\"role\":\"USER\""));
    }

    #[test]
    fn role_round_trips_through_upper_case() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        let role: Role = serde_json::from_str("\"USER\"").unwrap();
        assert_eq!(role, Role::User);
    }
}
