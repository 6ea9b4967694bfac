use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{ApiJson, ApiPath};
use crate::auth::{validate_email, validate_phone, RequireAuth};
use crate::domain::aggregates::{Profile, User};
use crate::error::{ApiResult, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[validate(length(min = 1, message = "firstName is required"))]
    #[serde(default)]
    pub first_name: String,
    #[validate(length(min = 1, message = "lastName is required"))]
    #[serde(default)]
    pub last_name: String,
    #[validate(custom = "validate_email")]
    #[serde(default)]
    pub email: String,
    #[validate(custom = "validate_phone")]
    #[serde(default)]
    pub phone_number: String,
    #[validate(length(min = 1, message = "location is required"))]
    #[serde(default)]
    pub location: String,
}

pub async fn list_users(State(state): State<AppState>, RequireAuth(_): RequireAuth) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.stores().users.list_users().await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<User>> {
    Ok(Json(find(&state, id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ProfileRequest>,
) -> ApiResult<Json<User>> {
    req.validate()?;
    let mut user = find(&state, id).await?;
    user.update_profile(Profile {
        first_name: req.first_name,
        last_name: req.last_name,
        phone_number: req.phone_number,
        location: req.location,
        email: req.email,
    });
    if !state.stores().users.update_user(&user).await? {
        return Err(AppError::not_found("User"));
    }
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    if !state.stores().users.delete_user(id).await? {
        return Err(AppError::not_found("User"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn find(state: &AppState, id: Uuid) -> ApiResult<User> {
    state.stores().users.get_user(id).await?.ok_or_else(|| AppError::not_found("User"))
}
