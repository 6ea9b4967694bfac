//! HTTP-facing error type.

use axum::{
    extract::{multipart::MultipartError, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::auth::AuthError;
use crate::domain::aggregates::CartError;
use crate::domain::value_objects::{PercentageError, SkuError};
use crate::images::ImageError;
use crate::pricing::EngineError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Unavailable(String),
    /// Logged in full; clients only see a generic message.
    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Internal(detail) => {
                error!(%detail, "Internal error");
                "Internal server error".to_string()
            }
            Self::Upstream(detail) => {
                error!(%detail, "Upstream error");
                "Image host request failed".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(what) => Self::Conflict(what),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::DiscountNotFound(_) => Self::not_found("Discount"),
            EngineError::TargetNotFound { .. } => Self::NotFound(e.to_string()),
            EngineError::Store(store) => store.into(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::InvalidToken(_) => {
                Self::Unauthorized(e.to_string())
            }
            AuthError::Signing(_) | AuthError::Hashing(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<ImageError> for AppError {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::InvalidFileName => Self::Validation(e.to_string()),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| match &err.message {
                    Some(message) => message.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        messages.sort();
        Self::Validation(messages.join("; "))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        Self::Validation(e.body_text())
    }
}

impl From<CartError> for AppError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::ItemNotFound => Self::not_found("Cart item"),
        }
    }
}

impl From<SkuError> for AppError {
    fn from(e: SkuError) -> Self {
        Self::Validation(format!("Invalid sku: {e}"))
    }
}

impl From<PercentageError> for AppError {
    fn from(e: PercentageError) -> Self {
        Self::Validation(format!("Invalid percentage: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use crate::domain::aggregates::TargetType;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::from(StoreError::Conflict("sku taken".into())).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::from(StoreError::Corrupt("bad row".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AppError::from(EngineError::DiscountNotFound(Uuid::nil())).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(EngineError::TargetNotFound { kind: TargetType::Collection, id: Uuid::nil() }).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::from(AuthError::MissingToken).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::from(ImageError::InvalidFileName).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::from(ImageError::EmptyToken).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::from(CartError::ItemNotFound).status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        use http_body_util::BodyExt;

        let response = AppError::Internal("connection refused at 10.0.0.3".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
    }
}
