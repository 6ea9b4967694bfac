use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use super::{ApiJson, ApiPath};
use crate::auth::RequireAuth;
use crate::domain::aggregates::{Product, ProductDraft};
use crate::domain::events::{DomainEvent, ProductEvent};
use crate::domain::value_objects::Sku;
use crate::error::{ApiResult, AppError};
use crate::state::AppState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language { English, Arabic }

/// Storefront shape of a product: one language, no admin-only fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: Uuid,
    pub sku: Sku,
    pub title: String,
    pub description: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    pub image: String,
    pub tags: Vec<String>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductView {
    pub fn localized(product: Product, language: Language) -> Self {
        let discounted = product.is_discounted();
        let (title, description) = match language {
            Language::English => (product.title, product.description),
            Language::Arabic => (product.title_ar, product.description_ar),
        };
        Self {
            id: product.id,
            sku: product.sku,
            title,
            description,
            price: product.price,
            original_price: product.original_price.filter(|_| discounted),
            image: product.image,
            tags: product.tags,
            stock: product.stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

pub fn localized(products: Vec<Product>, language: Language) -> Vec<ProductView> {
    products.into_iter().map(|p| ProductView::localized(p, language)).collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewParams {
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[serde(default)]
    pub sku: String,
    #[validate(length(min = 1, message = "title is required"))]
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub title_ar: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_ar: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(range(min = 0, message = "stock cannot be negative"))]
    #[serde(default)]
    pub stock: i32,
}

impl ProductRequest {
    fn into_draft(self) -> ApiResult<ProductDraft> {
        self.validate()?;
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(AppError::Validation("price must be greater than zero".into()));
        }
        Ok(ProductDraft {
            sku: Sku::new(self.sku)?,
            title: self.title,
            title_ar: self.title_ar,
            description: self.description,
            description_ar: self.description_ar,
            price: self.price,
            image: self.image,
            tags: self.tags,
            stock: self.stock,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    #[serde(default)]
    pub product_ids: Vec<Uuid>,
}

fn render(product: Product, admin: bool, language: Language) -> Response {
    if admin {
        Json(product).into_response()
    } else {
        Json(ProductView::localized(product, language)).into_response()
    }
}

fn render_all(products: Vec<Product>, admin: bool, language: Language) -> Response {
    if admin {
        Json(products).into_response()
    } else {
        Json(localized(products, language)).into_response()
    }
}

pub async fn list_products(State(state): State<AppState>, Query(params): Query<ViewParams>) -> ApiResult<Response> {
    let products = state.stores().products.list_products().await?;
    Ok(render_all(products, params.is_admin, Language::English))
}

pub async fn list_products_ar(State(state): State<AppState>) -> ApiResult<Response> {
    let products = state.stores().products.list_products().await?;
    Ok(render_all(products, false, Language::Arabic))
}

pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    Query(params): Query<ViewParams>,
) -> ApiResult<Response> {
    let product = find(&state, id).await?;
    Ok(render(product, params.is_admin, Language::English))
}

pub async fn get_product_ar(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Response> {
    let product = find(&state, id).await?;
    Ok(render(product, false, Language::Arabic))
}

pub async fn get_products_by_ids(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BatchRequest>,
) -> ApiResult<Json<Vec<ProductView>>> {
    if req.product_ids.is_empty() {
        return Err(AppError::Validation("productIds must not be empty".into()));
    }
    let products = state.stores().products.list_products_by_ids(&req.product_ids).await?;
    Ok(Json(localized(products, Language::English)))
}

pub async fn create_product(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiJson(req): ApiJson<ProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = Product::create(req.into_draft()?);
    state.stores().products.insert_product(&product).await?;
    for tag in &product.tags {
        if let Err(e) = state.stores().collections.add_to_tag(tag, product.id).await {
            warn!(product_id = %product.id, %tag, error = %e, "Failed to add product to tag collection");
        }
    }
    state
        .events()
        .publish(DomainEvent::Product(ProductEvent::Created { product_id: product.id, sku: product.sku.to_string() }))
        .await;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ProductRequest>,
) -> ApiResult<Json<Product>> {
    let draft = req.into_draft()?;
    let mut product = find(&state, id).await?;
    let previous_tags = product.tags.clone();
    product.update(draft);

    if !state.stores().products.update_product(&product).await? {
        return Err(AppError::not_found("Product"));
    }
    sync_tags(&state, product.id, &previous_tags, &product.tags).await;

    // original_price is not written by updates; re-read to report what is stored.
    let stored = find(&state, id).await?;
    state.events().publish(DomainEvent::Product(ProductEvent::Updated { product_id: id })).await;
    Ok(Json(stored))
}

pub async fn delete_product(
    State(state): State<AppState>,
    RequireAuth(_): RequireAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    let product = find(&state, id).await?;
    if !state.stores().products.delete_product(id).await? {
        return Err(AppError::not_found("Product"));
    }
    sync_tags(&state, id, &product.tags, &[]).await;
    state.events().publish(DomainEvent::Product(ProductEvent::Deleted { product_id: id })).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn find(state: &AppState, id: Uuid) -> ApiResult<Product> {
    state.stores().products.get_product(id).await?.ok_or_else(|| AppError::not_found("Product"))
}

/// Keeps tag collections' membership in line with the product's tags.
async fn sync_tags(state: &AppState, product_id: Uuid, before: &[String], after: &[String]) {
    let collections = &state.stores().collections;
    for tag in before.iter().filter(|t| !after.contains(t)) {
        if let Err(e) = collections.remove_from_tag(tag, product_id).await {
            warn!(%product_id, %tag, error = %e, "Failed to remove product from tag collection");
        }
    }
    for tag in after.iter().filter(|t| !before.contains(t)) {
        if let Err(e) = collections.add_to_tag(tag, product_id).await {
            warn!(%product_id, %tag, error = %e, "Failed to add product to tag collection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::sample;

    #[test]
    fn test_arabic_view_swaps_text_fields() {
        let mut product = sample("SOUQ-1", 100.0);
        product.title_ar = "صينية نحاس".into();
        product.description_ar = "وصف".into();
        let view = ProductView::localized(product, Language::Arabic);
        assert_eq!(view.title, "صينية نحاس");
        assert_eq!(view.description, "وصف");
    }

    #[test]
    fn test_view_hides_zero_original_price() {
        let mut product = sample("SOUQ-2", 100.0);
        product.original_price = Some(0.0);
        let json = serde_json::to_value(ProductView::localized(product, Language::English)).unwrap();
        assert!(json.get("originalPrice").is_none());
        assert!(json.get("titleAr").is_none());
    }
}
