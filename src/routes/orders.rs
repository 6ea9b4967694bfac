use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{ApiJson, ApiPath};
use crate::auth::{validate_phone, RequireAuth};
use crate::domain::aggregates::{CartItem, Order, OrderDetails};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::error::{ApiResult, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[validate(custom = "validate_phone")]
    #[serde(default)]
    pub phone_number: String,
    #[validate(length(min = 1, message = "userLocation is required"))]
    #[serde(default)]
    pub user_location: String,
    #[validate(length(min = 1, message = "an order needs at least one item"))]
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub discounted: bool,
}

impl OrderRequest {
    fn into_details(self) -> ApiResult<OrderDetails> {
        self.validate()?;
        if self.subtotal < 0.0 || self.total < 0.0 || !self.subtotal.is_finite() || !self.total.is_finite() {
            return Err(AppError::Validation("order amounts cannot be negative".into()));
        }
        Ok(OrderDetails {
            phone_number: self.phone_number,
            user_location: self.user_location,
            items: self.items,
            subtotal: self.subtotal,
            total: self.total,
            discounted: self.discounted,
        })
    }
}

pub async fn create_order(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    ApiJson(req): ApiJson<OrderRequest>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let (order, event) = Order::place(user_id, req.into_details()?);
    state.stores().orders.insert_order(&order).await?;
    info!(order_id = %order.id, order_number = %order.order_id, "Order placed");
    state.events().publish(event).await;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_orders(State(state): State<AppState>, RequireAuth(_): RequireAuth) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.stores().orders.list_orders().await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Order>> {
    Ok(Json(find(&state, id).await?))
}

pub async fn update_order(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<OrderRequest>,
) -> ApiResult<Json<Order>> {
    let details = req.into_details()?;
    let mut order = find(&state, id).await?;
    order.revise(details);
    if !state.stores().orders.update_order(&order).await? {
        return Err(AppError::not_found("Order"));
    }
    state.events().publish(DomainEvent::Order(OrderEvent::Updated { order_id: id })).await;
    Ok(Json(order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    if !state.stores().orders.delete_order(id).await? {
        return Err(AppError::not_found("Order"));
    }
    state.events().publish(DomainEvent::Order(OrderEvent::Deleted { order_id: id })).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn find(state: &AppState, id: Uuid) -> ApiResult<Order> {
    state.stores().orders.get_order(id).await?.ok_or_else(|| AppError::not_found("Order"))
}
