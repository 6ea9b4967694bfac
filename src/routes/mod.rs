//! HTTP routes.
//!
//! Catalog reads, announcement and discount listings, the batch product
//! lookup, signup and login are public. Everything else takes
//! [`RequireAuth`](crate::auth::RequireAuth).

use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, FromRequest, FromRequestParts},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::state::AppState;

pub mod announcements;
pub mod auth;
pub mod carts;
pub mod collections;
pub mod discounts;
pub mod images;
pub mod orders;
pub mod products;
pub mod users;
pub mod wishlists;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// JSON body extractor whose rejections use the API error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path extractor; a malformed id is a 400 in the API error shape.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "healthy", "service": "souq-storefront"})) }))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/products", get(products::list_products).post(products::create_product))
        .route("/products/batch", post(products::get_products_by_ids))
        .route(
            "/products/:id",
            get(products::get_product).put(products::update_product).delete(products::delete_product),
        )
        .route("/ar/products", get(products::list_products_ar))
        .route("/ar/products/:id", get(products::get_product_ar))
        .route("/collections", get(collections::list_collections).post(collections::create_collection))
        .route(
            "/collections/:id",
            get(collections::get_collection)
                .put(collections::update_collection)
                .delete(collections::delete_collection),
        )
        .route("/collections/:id/products", get(collections::collection_products))
        .route("/ar/collections/:id/products", get(collections::collection_products_ar))
        .route("/discounts", get(discounts::list_discounts).post(discounts::create_discount))
        .route(
            "/discounts/:id",
            get(discounts::get_discount).put(discounts::update_discount).delete(discounts::delete_discount),
        )
        .route("/cart", get(carts::get_cart))
        .route("/cart/items", post(carts::add_item))
        .route("/cart/items/:product_id", put(carts::update_item).delete(carts::remove_item))
        .route("/wishlist", get(wishlists::get_wishlist))
        .route("/wishlist/items", post(wishlists::add_item))
        .route("/wishlist/items/:item_id", axum::routing::delete(wishlists::remove_item))
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route("/orders/:id", get(orders::get_order).put(orders::update_order).delete(orders::delete_order))
        .route("/users", get(users::list_users))
        .route("/users/:id", get(users::get_user).put(users::update_user).delete(users::delete_user))
        .route(
            "/announcements",
            get(announcements::list_announcements).post(announcements::create_announcement),
        )
        .route(
            "/announcements/:id",
            put(announcements::update_announcement).delete(announcements::delete_announcement),
        )
        .route("/images", post(images::upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
