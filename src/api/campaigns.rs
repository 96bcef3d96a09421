use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::AuthUser;
use super::users::UserResponse;
use super::validation::{
    ensure_valid, validate_accessibility, validate_campaign_name, validate_id, validate_past_date,
};
use super::{ApiError, AppState};
use crate::db::CampaignPatch;
use crate::entities::campaigns;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Create/update payload. hostId is validated when present but ignored at
/// creation time, where the authenticated caller always becomes the host.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignRequest {
    pub name: Option<String>,
    pub host_id: Option<i32>,
    pub start_date: Option<String>,
    pub accessibility_int: Option<i32>,
}

impl CampaignRequest {
    fn contains_updatable(&self) -> bool {
        self.name.is_some()
            || self.host_id.is_some()
            || self.start_date.is_some()
            || self.accessibility_int.is_some()
    }

    fn validate(&self) -> Result<(), ApiError> {
        let mut violations = Vec::new();
        if let Some(name) = &self.name {
            violations.extend(validate_campaign_name("name", name));
        }
        if let Some(host_id) = self.host_id {
            violations.extend(validate_id("hostId", host_id));
        }
        if let Some(start_date) = &self.start_date {
            violations.extend(validate_past_date("startDate", start_date));
        }
        if let Some(accessibility) = self.accessibility_int {
            violations.extend(validate_accessibility("accessibilityInt", accessibility));
        }
        ensure_valid(violations)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignResponse {
    pub id: i32,
    pub name: String,
    pub host_id: i32,
    pub start_date: String,
    pub accessibility_int: i32,
}

impl From<campaigns::Model> for CampaignResponse {
    fn from(model: campaigns::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            host_id: model.host_id,
            start_date: model.start_date,
            accessibility_int: model.accessibility,
        }
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/campaigns
/// Create a campaign hosted by the authenticated caller
pub async fn create_campaign(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<CampaignRequest>,
) -> Result<Json<CampaignResponse>, ApiError> {
    payload.validate()?;

    let Some(name) = payload.name else {
        return Err(ApiError::bad_request("Campaign name is missing"));
    };

    // Whatever hostId the client sent, the caller hosts what they create.
    let campaign = state
        .store()
        .create_campaign(
            &name,
            auth.id,
            payload.start_date,
            payload.accessibility_int.unwrap_or_default(),
        )
        .await?;

    tracing::info!("User {} created campaign {}", auth.id, campaign.id);

    Ok(Json(campaign.into()))
}

/// GET /api/campaigns/{id}
pub async fn get_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<CampaignResponse>, ApiError> {
    let campaign = state
        .store()
        .get_campaign(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No Campaign with specified id"))?;

    Ok(Json(campaign.into()))
}

/// PUT /api/campaigns/{id}
/// Partial update, host only. A host change requires the incoming host to
/// exist before anything is written.
pub async fn update_campaign(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<CampaignRequest>,
) -> Result<Json<CampaignResponse>, ApiError> {
    payload.validate()?;

    if !payload.contains_updatable() {
        return Err(ApiError::bad_request("No updatable Campaign fields provided"));
    }

    let campaign = state
        .store()
        .get_campaign(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No Campaign with specified id"))?;

    if campaign.host_id != auth.id {
        return Err(ApiError::forbidden(
            "User is not able to modify specified Campaign",
        ));
    }

    if let Some(new_host_id) = payload.host_id
        && state.store().get_user(new_host_id).await?.is_none()
    {
        return Err(ApiError::not_found("User to become Campaign Host not found"));
    }

    let patch = CampaignPatch {
        name: payload.name,
        host_id: payload.host_id,
        start_date: payload.start_date,
        accessibility: payload.accessibility_int,
    };

    let updated = state
        .store()
        .update_campaign(id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("No Campaign with specified id"))?;

    Ok(Json(updated.into()))
}

/// DELETE /api/campaigns/{id}
/// Host only; participant pivots are removed by relational cascade
pub async fn delete_campaign(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let campaign = state
        .store()
        .get_campaign(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No Campaign with specified id"))?;

    if campaign.host_id != auth.id {
        return Err(ApiError::forbidden(
            "User is not able to delete specified Campaign",
        ));
    }

    state.store().remove_campaign(id).await?;

    tracing::info!("User {} deleted campaign {}", auth.id, id);

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/campaigns/{id}/participants
/// The authenticated caller joins the campaign; joining twice is a no-op
pub async fn join_campaign(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.store().get_campaign(id).await?.is_none() {
        return Err(ApiError::not_found("No Campaign with specified id"));
    }

    let attached = state.store().attach_participant(id, auth.id).await?;
    if attached {
        tracing::info!("User {} joined campaign {}", auth.id, id);
    }

    Ok(Json(MessageResponse {
        message: "Joined Campaign".to_string(),
    }))
}

/// DELETE /api/campaigns/{id}/participants
/// The authenticated caller leaves the campaign
pub async fn leave_campaign(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if state.store().get_campaign(id).await?.is_none() {
        return Err(ApiError::not_found("No Campaign with specified id"));
    }

    state.store().detach_participant(id, auth.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/campaigns/{id}/participants
pub async fn list_participants(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let participants = state
        .store()
        .campaign_participants(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No Campaign with specified id"))?;

    Ok(Json(participants.into_iter().map(Into::into).collect()))
}
