use axum::{extract::{Multipart, State}, Json};
use serde_json::{json, Value};

use crate::auth::RequireAuth;
use crate::error::{ApiResult, AppError};
use crate::state::AppState;

/// Relays the multipart `file` field to the image host.
pub async fn upload_image(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let host = state
        .images()
        .ok_or_else(|| AppError::Unavailable("Image uploads are not configured".into()))?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| AppError::Validation("file field has no file name".into()))?;
        let bytes = field.bytes().await?;
        let url = host.upload(&file_name, bytes.to_vec()).await?;
        return Ok(Json(json!({ "url": url })));
    }
    Err(AppError::Validation("Missing file field".into()))
}
