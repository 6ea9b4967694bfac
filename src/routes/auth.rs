use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::ApiJson;
use crate::auth::{hash_password, validate_email, validate_password, validate_phone, verify_password, AuthError};
use crate::domain::aggregates::{Profile, User};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "firstName is required"))]
    #[serde(default)]
    pub first_name: String,
    #[validate(length(min = 1, message = "lastName is required"))]
    #[serde(default)]
    pub last_name: String,
    #[validate(custom = "validate_email")]
    #[serde(default)]
    pub email: String,
    #[validate(custom = "validate_password")]
    #[serde(default)]
    pub password: String,
    #[validate(custom = "validate_phone")]
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;
    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))??;

    let user = User::register(
        Profile {
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
            location: req.location,
            email: req.email,
        },
        password_hash,
    );
    state.stores().users.insert_user(&user).await?;
    let token = state.tokens().issue(user.id)?;
    info!(user_id = %user.id, "User signed up");
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

pub async fn login(State(state): State<AppState>, ApiJson(req): ApiJson<LoginRequest>) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .stores()
        .users
        .find_user_by_email(&req.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let hash = user.password_hash.clone();
    let password = req.password;
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))??;

    let token = state.tokens().issue(user.id)?;
    Ok(Json(AuthResponse { token, user }))
}
