//! Discount records and their price effects.
//!
//! The record write and the product price writes are separate. On create,
//! and when applying new terms on update, a missing target or a failed member
//! update is logged and reported, and the record operation still succeeds.
//! Reverting the previous effect is stricter: if any product fails to revert,
//! update and delete abort before the record changes, so no product is left
//! discounted by a record that no longer describes it. Products that did
//! revert stay reverted; a retry only touches the ones still marked.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

use super::{ApiJson, ApiPath};
use crate::auth::RequireAuth;
use crate::domain::aggregates::{Discount, DiscountTerms, TargetType};
use crate::domain::events::{DiscountEvent, DomainEvent};
use crate::domain::value_objects::Percentage;
use crate::error::{ApiResult, AppError};
use crate::pricing::{EngineError, FailedUpdate, FanOutReport};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRequest {
    #[serde(default)]
    pub target_type: String,
    pub target_id: Option<Uuid>,
    pub percentage: Option<f64>,
}

impl DiscountRequest {
    fn into_terms(self) -> ApiResult<DiscountTerms> {
        let target_type: TargetType = self.target_type.parse().map_err(AppError::Validation)?;
        let target_id = self.target_id.ok_or_else(|| AppError::Validation("targetId is required".into()))?;
        let percentage = self.percentage.ok_or_else(|| AppError::Validation("percentage is required".into()))?;
        Ok(DiscountTerms { target_type, target_id, percentage: Percentage::new(percentage)? })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountResponse {
    pub discount: Discount,
    /// Effect of applying the discount.
    pub report: FanOutReport,
    /// Effect of reverting the previous terms, on update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverted: Option<FanOutReport>,
}

pub async fn list_discounts(State(state): State<AppState>) -> ApiResult<Json<Vec<Discount>>> {
    Ok(Json(state.stores().discounts.list_discounts().await?))
}

pub async fn get_discount(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<Discount>> {
    Ok(Json(find(&state, id).await?))
}

pub async fn create_discount(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiJson(req): ApiJson<DiscountRequest>,
) -> ApiResult<(StatusCode, Json<DiscountResponse>)> {
    let discount = Discount::create(req.into_terms()?);
    state.stores().discounts.insert_discount(&discount).await?;
    let report = apply(&state, &discount).await;
    Ok((StatusCode::CREATED, Json(DiscountResponse { discount, report, reverted: None })))
}

pub async fn update_discount(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<DiscountRequest>,
) -> ApiResult<Json<DiscountResponse>> {
    let terms = req.into_terms()?;
    let mut discount = find(&state, id).await?;

    let reverted = revert(&state, &discount).await?;
    discount.retarget(terms);
    if !state.stores().discounts.update_discount(&discount).await? {
        return Err(AppError::not_found("Discount"));
    }
    let report = apply(&state, &discount).await;
    Ok(Json(DiscountResponse { discount, report, reverted: Some(reverted) }))
}

pub async fn delete_discount(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<FanOutReport>> {
    let discount = find(&state, id).await?;
    let reverted = revert(&state, &discount).await?;
    if !state.stores().discounts.delete_discount(id).await? {
        return Err(AppError::not_found("Discount"));
    }
    state.events().publish(DomainEvent::Discount(DiscountEvent::Deleted { discount_id: id })).await;
    Ok(Json(reverted))
}

async fn find(state: &AppState, id: Uuid) -> ApiResult<Discount> {
    state.stores().discounts.get_discount(id).await?.ok_or_else(|| AppError::not_found("Discount"))
}

/// Applies the discount, folding every failure into the report.
async fn apply(state: &AppState, discount: &Discount) -> FanOutReport {
    let report = match state.engine().apply(discount).await {
        Ok(report) => report,
        Err(EngineError::TargetNotFound { kind, id }) => {
            warn!(discount_id = %discount.id, %kind, target = %id, "Discount target not found, price unchanged");
            FanOutReport::default()
        }
        Err(e) => {
            error!(discount_id = %discount.id, error = %e, "Failed to apply discount");
            FanOutReport {
                attempted: 1,
                failed: vec![FailedUpdate { product_id: discount.target_id, reason: e.to_string() }],
                ..FanOutReport::default()
            }
        }
    };
    if !report.is_complete() {
        warn!(discount_id = %discount.id, failed = report.failed.len(), "Discount partially applied");
    }
    state
        .events()
        .publish(DomainEvent::Discount(DiscountEvent::Applied {
            discount_id: discount.id,
            target_id: discount.target_id,
            succeeded: report.succeeded,
            failed: report.failed.len(),
        }))
        .await;
    report
}

/// Reverts the discount's current effect. A vanished target is tolerated;
/// a store failure, or any product left unreverted, is returned as an error
/// so the caller leaves the record untouched.
async fn revert(state: &AppState, discount: &Discount) -> ApiResult<FanOutReport> {
    let report = match state.engine().revert_discount(discount).await {
        Ok(report) => report,
        Err(EngineError::TargetNotFound { kind, id }) => {
            warn!(discount_id = %discount.id, %kind, target = %id, "Discount target not found, nothing to revert");
            FanOutReport::default()
        }
        Err(e) => return Err(e.into()),
    };
    state
        .events()
        .publish(DomainEvent::Discount(DiscountEvent::Reverted {
            discount_id: discount.id,
            target_id: discount.target_id,
            succeeded: report.succeeded,
            failed: report.failed.len(),
        }))
        .await;
    if !report.is_complete() {
        warn!(discount_id = %discount.id, failed = report.failed.len(), "Discount partially reverted, record left unchanged");
        return Err(AppError::Internal(format!(
            "discount {} left {} products discounted after revert",
            discount.id,
            report.failed.len()
        )));
    }
    Ok(report)
}
