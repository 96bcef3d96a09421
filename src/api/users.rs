use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::AuthUser;
use super::campaigns::CampaignResponse;
use super::validation::{
    ensure_valid, validate_email, validate_id, validate_password, validate_past_date,
    validate_person_name, validate_username,
};
use super::{ApiError, AppState};
use crate::db::{User, UserProfilePatch};
use crate::entities::auth_tokens;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Public profile representation. The password hash never leaves the store
/// layer, so it cannot appear here.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub registration_date: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            registration_date: user.registration_date,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub id: i32,
    pub token: String,
    pub user_id: i32,
    pub auth_date: String,
}

impl From<auth_tokens::Model> for TokenResponse {
    fn from(model: auth_tokens::Model) -> Self {
        Self {
            id: model.id,
            token: model.token,
            user_id: model.user_id,
            auth_date: model.auth_date,
        }
    }
}

/// Self-update payload. Absent fields are left untouched; id, password and
/// registrationDate are accepted for validation but never written back.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUserRequest {
    pub id: Option<i32>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub registration_date: Option<String>,
}

impl UpdateUserRequest {
    fn contains_updatable(&self) -> bool {
        self.email.is_some()
            || self.first_name.is_some()
            || self.last_name.is_some()
            || self.username.is_some()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/users/register
/// Create a user from an email/password pair
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut violations = Vec::new();
    violations.extend(validate_email("email", &payload.email));
    violations.extend(validate_password("password", &payload.password));
    ensure_valid(violations)?;

    let existing = state.store().get_user_by_email(&payload.email).await?;
    if existing.is_some() {
        return Err(ApiError::bad_request("A User with this email already exists"));
    }

    let user = state
        .store()
        .register_user(&payload.email, &payload.password, &state.config().security)
        .await?;

    tracing::info!("Registered user {}", user.id);

    Ok(Json(user.into()))
}

/// POST /api/users/login
/// Verify credentials and issue a bearer token, superseding any prior one
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if validate_email("email", &payload.email).is_some() {
        return Err(ApiError::bad_request("Wrong email format"));
    }

    let Some((user, password_hash)) = state
        .store()
        .get_user_by_email_with_password(&payload.email)
        .await?
    else {
        return Err(ApiError::not_found("No User with specified email"));
    };

    let is_valid =
        crate::db::repositories::user::verify_password(password_hash, payload.password).await?;
    if !is_valid {
        return Err(ApiError::Unauthorized("Wrong password".to_string()));
    }

    let token = state.store().issue_token(user.id).await?;

    tracing::info!("Issued token for user {}", user.id);

    Ok(Json(token.into()))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .store()
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No User with specified id"))?;

    Ok(Json(user.into()))
}

/// PUT /api/users
/// Partial self-update of the authenticated user's profile
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut violations = Vec::new();
    if let Some(id) = payload.id {
        violations.extend(validate_id("id", id));
    }
    if let Some(email) = &payload.email {
        violations.extend(validate_email("email", email));
    }
    if let Some(password) = &payload.password {
        violations.extend(validate_password("password", password));
    }
    if let Some(first_name) = &payload.first_name {
        violations.extend(validate_person_name("firstName", first_name));
    }
    if let Some(last_name) = &payload.last_name {
        violations.extend(validate_person_name("lastName", last_name));
    }
    if let Some(username) = &payload.username {
        violations.extend(validate_username("username", username));
    }
    if let Some(registration_date) = &payload.registration_date {
        violations.extend(validate_past_date("registrationDate", registration_date));
    }
    ensure_valid(violations)?;

    if !payload.contains_updatable() {
        return Err(ApiError::bad_request("No updatable User fields provided"));
    }

    let patch = UserProfilePatch {
        email: payload.email,
        first_name: payload.first_name,
        last_name: payload.last_name,
        username: payload.username,
    };

    let user = state
        .store()
        .update_user_profile(auth.id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("No User with specified id"))?;

    Ok(Json(user.into()))
}

/// GET /api/users/{id}/campaigns
/// Campaigns the user currently hosts
pub async fn hosted_campaigns(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<CampaignResponse>>, ApiError> {
    if state.store().get_user(id).await?.is_none() {
        return Err(ApiError::not_found("No User with specified id"));
    }

    let campaigns = state.store().hosted_campaigns(id).await?;

    Ok(Json(campaigns.into_iter().map(Into::into).collect()))
}

/// GET /api/users/{id}/participations
/// Campaigns the user has joined as a participant
pub async fn participated_campaigns(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<CampaignResponse>>, ApiError> {
    let campaigns = state
        .store()
        .participated_campaigns(id)
        .await?
        .ok_or_else(|| ApiError::not_found("No User with specified id"))?;

    Ok(Json(campaigns.into_iter().map(Into::into).collect()))
}
