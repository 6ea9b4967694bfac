use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{ApiJson, ApiPath};
use crate::auth::RequireAuth;
use crate::domain::aggregates::{Cart, CartItem};
use crate::error::{ApiResult, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

pub async fn get_cart(State(state): State<AppState>, RequireAuth(user_id): RequireAuth) -> ApiResult<Json<Cart>> {
    let cart = state.stores().carts.get_cart(user_id).await?.ok_or_else(|| AppError::not_found("Cart"))?;
    Ok(Json(cart))
}

pub async fn add_item(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    ApiJson(req): ApiJson<AddItemRequest>,
) -> ApiResult<(StatusCode, Json<Cart>)> {
    req.validate()?;
    if state.stores().products.get_product(req.product_id).await?.is_none() {
        return Err(AppError::not_found("Product"));
    }
    let mut cart = state.stores().carts.get_cart(user_id).await?.unwrap_or_else(|| Cart::for_user(user_id));
    cart.add_item(CartItem { product_id: req.product_id, quantity: req.quantity });
    state.stores().carts.save_cart(&cart).await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

pub async fn update_item(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    ApiPath(product_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateItemRequest>,
) -> ApiResult<Json<Cart>> {
    let mut cart = existing_cart(&state, user_id).await?;
    cart.update_quantity(product_id, req.quantity)?;
    state.stores().carts.save_cart(&cart).await?;
    Ok(Json(cart))
}

pub async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    ApiPath(product_id): ApiPath<Uuid>,
) -> ApiResult<Json<Cart>> {
    let mut cart = existing_cart(&state, user_id).await?;
    cart.remove_item(product_id)?;
    state.stores().carts.save_cart(&cart).await?;
    Ok(Json(cart))
}

async fn existing_cart(state: &AppState, user_id: Uuid) -> ApiResult<Cart> {
    state.stores().carts.get_cart(user_id).await?.ok_or_else(|| AppError::not_found("Cart item"))
}
