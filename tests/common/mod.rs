#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use souq_storefront::auth::TokenIssuer;
use souq_storefront::config::AuthConfig;
use souq_storefront::domain::aggregates::{Product, ProductDraft};
use souq_storefront::domain::value_objects::Sku;
use souq_storefront::images::ImageHost;
use souq_storefront::publisher::EventPublisher;
use souq_storefront::store::Stores;
use souq_storefront::{router, AppState};

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: SecretString::from("integration-test-secret-at-least-32-bytes".to_string()),
        issuer: "OldSouqsApp".into(),
        token_ttl: chrono::Duration::hours(24),
    }
}

pub struct TestApp {
    pub router: Router,
    pub stores: Stores,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_images(None)
    }

    pub fn with_images(images: Option<ImageHost>) -> Self {
        Self::build(Stores::memory(), images)
    }

    pub fn with_stores(stores: Stores) -> Self {
        Self::build(stores, None)
    }

    fn build(stores: Stores, images: Option<ImageHost>) -> Self {
        let state = AppState::new(stores.clone(), TokenIssuer::new(&auth_config()), images, EventPublisher::disabled());
        let token = TokenIssuer::new(&auth_config()).issue(Uuid::now_v7()).unwrap();
        Self { router: router(state, std::time::Duration::from_secs(5)), stores, token }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, body)
    }

    /// JSON request carrying the default bearer token.
    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.call_as(Some(&self.token), method, uri, body).await
    }

    pub async fn call_as(&self, token: Option<&str>, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call_as(None, Method::GET, uri, None).await
    }

    pub async fn seed_product(&self, sku: &str, price: f64, original_price: Option<f64>) -> Product {
        let mut product = Product::create(ProductDraft {
            sku: Sku::new(sku).unwrap(),
            title: format!("Item {sku}"),
            title_ar: format!("منتج {sku}"),
            description: String::new(),
            description_ar: String::new(),
            price,
            image: String::new(),
            tags: vec![],
            stock: 5,
        });
        product.original_price = original_price;
        self.stores.products.insert_product(&product).await.unwrap();
        product
    }

    pub async fn product(&self, id: Uuid) -> Product {
        self.stores.products.get_product(id).await.unwrap().unwrap()
    }
}
