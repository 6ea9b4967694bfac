use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{ApiJson, ApiPath};
use crate::auth::RequireAuth;
use crate::domain::aggregates::Announcement;
use crate::error::{ApiResult, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct AnnouncementRequest {
    #[validate(length(min = 1, message = "message is required"))]
    #[serde(default)]
    pub message: String,
}

pub async fn list_announcements(State(state): State<AppState>) -> ApiResult<Json<Vec<Announcement>>> {
    Ok(Json(state.stores().announcements.list_announcements().await?))
}

pub async fn create_announcement(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiJson(req): ApiJson<AnnouncementRequest>,
) -> ApiResult<(StatusCode, Json<Announcement>)> {
    req.validate()?;
    let announcement = Announcement::create(req.message);
    state.stores().announcements.insert_announcement(&announcement).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

pub async fn update_announcement(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AnnouncementRequest>,
) -> ApiResult<Json<Announcement>> {
    req.validate()?;
    let mut announcement = state
        .stores()
        .announcements
        .get_announcement(id)
        .await?
        .ok_or_else(|| AppError::not_found("Announcement"))?;
    announcement.edit(req.message);
    if !state.stores().announcements.update_announcement(&announcement).await? {
        return Err(AppError::not_found("Announcement"));
    }
    Ok(Json(announcement))
}

pub async fn delete_announcement(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    if !state.stores().announcements.delete_announcement(id).await? {
        return Err(AppError::not_found("Announcement"));
    }
    Ok(StatusCode::NO_CONTENT)
}
