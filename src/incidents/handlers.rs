use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreateIncidentRequest, IncidentSaved, UpdateIncidentRequest};
use crate::auth::extract::Identity;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::store::{IncidentPatch, IncidentWithReporter, NewIncident};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_incidents).post(create_incident))
        .route(
            "/:id",
            get(get_incident).put(update_incident).delete(delete_incident),
        )
}

/// Admins see the whole fleet, enriched with reporter details; everyone
/// else sees only their own reports.
#[instrument(skip(state))]
async fn list_incidents(State(state): State<AppState>, identity: Identity) -> ApiResult<Response> {
    if identity.role.is_admin() {
        let incidents = state.store.list_incidents().await?;
        return Ok(Json(incidents).into_response());
    }

    let incidents = state.store.list_incidents_by_owner(identity.id).await?;
    Ok(Json(incidents).into_response())
}

/// Absence answers 404 before the ownership check runs.
#[instrument(skip(state))]
async fn get_incident(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<IncidentWithReporter>> {
    let incident = state
        .store
        .incident_with_reporter(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Incident not found"))?;

    if !identity.can_access(incident.incident.user_id) {
        warn!(requester = %identity.id, incident = %id, "cross-user incident read denied");
        return Err(ApiError::forbidden(
            "Access denied. You can only view your own incidents.",
        ));
    }

    Ok(Json(incident))
}

#[instrument(skip(state, payload))]
async fn create_incident(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<CreateIncidentRequest>,
) -> ApiResult<(StatusCode, Json<IncidentSaved>)> {
    let (Some(description), Some(date)) = (
        payload.description.filter(|s| !s.is_empty()),
        payload.date,
    ) else {
        return Err(ApiError::validation("Missing required fields"));
    };

    let incident = state
        .store
        .create_incident(NewIncident {
            description,
            date,
            user_id: identity.id,
        })
        .await?;

    info!(incident_id = %incident.id, user_id = %identity.id, "incident created");
    Ok((
        StatusCode::CREATED,
        Json(IncidentSaved {
            message: "Incident created successfully",
            incident,
        }),
    ))
}

#[instrument(skip(state, payload))]
async fn update_incident(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateIncidentRequest>,
) -> ApiResult<Json<IncidentSaved>> {
    let existing = state
        .store
        .incident_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Incident not found"))?;

    if !identity.can_access(existing.user_id) {
        return Err(ApiError::forbidden(
            "Access denied. You can only update your own incidents.",
        ));
    }

    let incident = state
        .store
        .update_incident(
            id,
            IncidentPatch {
                description: payload.description,
                date: payload.date,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Incident not found"))?;

    info!(incident_id = %id, "incident updated");
    Ok(Json(IncidentSaved {
        message: "Incident updated successfully",
        incident,
    }))
}

#[instrument(skip(state))]
async fn delete_incident(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let existing = state
        .store
        .incident_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Incident not found"))?;

    if !identity.can_access(existing.user_id) {
        return Err(ApiError::forbidden(
            "Access denied. You can only delete your own incidents.",
        ));
    }

    state.store.delete_incident(id).await?;
    info!(incident_id = %id, user_id = %identity.id, "incident deleted");
    Ok(Json(json!({ "message": "Incident deleted successfully" })))
}
