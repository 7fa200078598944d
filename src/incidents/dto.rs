use serde::Deserialize;
use time::OffsetDateTime;

use crate::store::Incident;

/// Request body for creating an incident. Presence is checked by the
/// handler; the owner is always the authenticated caller.
#[derive(Debug, Deserialize)]
pub struct CreateIncidentRequest {
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
}

/// Partial incident update. Absent fields keep their stored values.
#[derive(Debug, Deserialize)]
pub struct UpdateIncidentRequest {
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
}

#[derive(Debug, serde::Serialize)]
pub struct IncidentSaved {
    pub message: &'static str,
    pub incident: Incident,
}
