use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::products::{localized, Language, ProductView};
use super::{ApiJson, ApiPath};
use crate::auth::RequireAuth;
use crate::domain::aggregates::Collection;
use crate::error::{ApiResult, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRequest {
    #[validate(length(min = 1, message = "collectionName is required"))]
    #[serde(default)]
    pub collection_name: String,
    /// Omitted on update keeps the current members.
    pub product_ids: Option<Vec<Uuid>>,
    pub show_collection: Option<bool>,
}

pub async fn list_collections(State(state): State<AppState>) -> ApiResult<Json<Vec<Collection>>> {
    Ok(Json(state.stores().collections.list_collections(true).await?))
}

pub async fn get_collection(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<Collection>> {
    Ok(Json(find_visible(&state, id).await?))
}

pub async fn create_collection(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiJson(req): ApiJson<CollectionRequest>,
) -> ApiResult<(StatusCode, Json<Collection>)> {
    req.validate()?;
    let mut collection = Collection::create(req.collection_name.trim(), req.show_collection.unwrap_or(true));
    for id in req.product_ids.unwrap_or_default() {
        collection.add_product(id);
    }
    state.stores().collections.insert_collection(&collection).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

pub async fn update_collection(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CollectionRequest>,
) -> ApiResult<Json<Collection>> {
    req.validate()?;
    let mut collection = state
        .stores()
        .collections
        .get_collection(id)
        .await?
        .ok_or_else(|| AppError::not_found("Collection"))?;

    collection.collection_name = req.collection_name.trim().to_string();
    if let Some(show) = req.show_collection {
        collection.show_collection = show;
    }
    if let Some(ids) = req.product_ids {
        collection.product_ids.clear();
        for product_id in ids {
            collection.add_product(product_id);
        }
    }
    if !state.stores().collections.update_collection(&collection).await? {
        return Err(AppError::not_found("Collection"));
    }
    Ok(Json(collection))
}

pub async fn delete_collection(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    if !state.stores().collections.delete_collection(id).await? {
        return Err(AppError::not_found("Collection"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn collection_products(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<ProductView>>> {
    members(&state, id, Language::English).await
}

pub async fn collection_products_ar(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<ProductView>>> {
    members(&state, id, Language::Arabic).await
}

/// Lists members whether or not the collection is shown in the catalog.
async fn members(state: &AppState, id: Uuid, language: Language) -> ApiResult<Json<Vec<ProductView>>> {
    if state.stores().collections.get_collection(id).await?.is_none() {
        return Err(AppError::not_found("Collection"));
    }
    let products = state.stores().products.list_products_in_collection(id).await?;
    Ok(Json(localized(products, language)))
}

async fn find_visible(state: &AppState, id: Uuid) -> ApiResult<Collection> {
    state
        .stores()
        .collections
        .get_collection(id)
        .await?
        .filter(|c| c.show_collection)
        .ok_or_else(|| AppError::not_found("Collection"))
}
