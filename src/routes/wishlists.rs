use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiJson, ApiPath};
use crate::auth::RequireAuth;
use crate::domain::aggregates::{Wishlist, WishlistItem};
use crate::error::{ApiResult, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: Uuid,
}

pub async fn get_wishlist(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> ApiResult<Json<Vec<WishlistItem>>> {
    let items = state
        .stores()
        .wishlists
        .get_wishlist(user_id)
        .await?
        .map(|w| w.wishlist_items)
        .unwrap_or_default();
    Ok(Json(items))
}

pub async fn add_item(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    ApiJson(req): ApiJson<AddItemRequest>,
) -> ApiResult<(StatusCode, Json<WishlistItem>)> {
    if state.stores().products.get_product(req.product_id).await?.is_none() {
        return Err(AppError::not_found("Product"));
    }
    let mut wishlist =
        state.stores().wishlists.get_wishlist(user_id).await?.unwrap_or_else(|| Wishlist::for_user(user_id));
    let item = wishlist.add(req.product_id);
    state.stores().wishlists.save_wishlist(&wishlist).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    ApiPath(item_id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    let mut wishlist = state
        .stores()
        .wishlists
        .get_wishlist(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Wishlist item"))?;
    if !wishlist.remove(item_id) {
        return Err(AppError::not_found("Wishlist item"));
    }
    state.stores().wishlists.save_wishlist(&wishlist).await?;
    Ok(StatusCode::NO_CONTENT)
}
