mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::TestApp;
use souq_storefront::domain::aggregates::{PriceChange, Product};
use souq_storefront::store::{MemoryStore, ProductStore, StoreError, Stores};

type StoreResult<T> = Result<T, StoreError>;

/// Memory-backed product store whose restores fail for one product.
struct FailingRestore {
    inner: Arc<MemoryStore>,
    broken: Uuid,
}

#[async_trait]
impl ProductStore for FailingRestore {
    async fn insert_product(&self, product: &Product) -> StoreResult<()> { self.inner.insert_product(product).await }
    async fn get_product(&self, id: Uuid) -> StoreResult<Option<Product>> { self.inner.get_product(id).await }
    async fn list_products(&self) -> StoreResult<Vec<Product>> { self.inner.list_products().await }
    async fn list_products_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Product>> {
        self.inner.list_products_by_ids(ids).await
    }
    async fn list_products_in_collection(&self, collection_id: Uuid) -> StoreResult<Vec<Product>> {
        self.inner.list_products_in_collection(collection_id).await
    }
    async fn update_product(&self, product: &Product) -> StoreResult<bool> { self.inner.update_product(product).await }
    async fn delete_product(&self, id: Uuid) -> StoreResult<bool> { self.inner.delete_product(id).await }
    async fn mark_discounted(&self, id: Uuid, change: PriceChange) -> StoreResult<bool> {
        self.inner.mark_discounted(id, change).await
    }
    async fn restore_original_price(&self, id: Uuid, discount_id: Uuid) -> StoreResult<Option<f64>> {
        if id == self.broken {
            return Err(StoreError::Corrupt(format!("product {id} unreadable")));
        }
        self.inner.restore_original_price(id, discount_id).await
    }
}

/// Stores sharing one memory backend, with `products` swapped in.
fn stores_over(backend: &Arc<MemoryStore>, products: Arc<dyn ProductStore>) -> Stores {
    Stores {
        products,
        collections: backend.clone(),
        discounts: backend.clone(),
        carts: backend.clone(),
        wishlists: backend.clone(),
        orders: backend.clone(),
        users: backend.clone(),
        announcements: backend.clone(),
    }
}

async fn create_collection(app: &TestApp, name: &str, members: &[Uuid]) -> String {
    let (status, collection) =
        app.call(Method::POST, "/collections", Some(json!({"collectionName": name, "productIds": members}))).await;
    assert_eq!(status, StatusCode::CREATED);
    collection["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_product_discount_apply_and_revert_on_delete() {
    let app = TestApp::new();
    let product = app.seed_product("BRASS-TRAY", 100.0, None).await;

    let (status, body) = app
        .call(Method::POST, "/discounts", Some(json!({"targetType": "product", "targetId": product.id, "percentage": 20})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["report"]["succeeded"], 1);
    assert_eq!(body["discount"]["targetType"], "product");

    let stored = app.product(product.id).await;
    assert_eq!(stored.price, 80.0);
    assert_eq!(stored.original_price, Some(100.0));

    let id = body["discount"]["id"].as_str().unwrap().to_string();
    let (status, report) = app.call(Method::DELETE, &format!("/discounts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["succeeded"], 1);

    let stored = app.product(product.id).await;
    assert_eq!(stored.price, 100.0);
    assert_eq!(stored.original_price, None);

    let (status, _) = app.get(&format!("/discounts/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_collection_discount_skips_already_discounted_members() {
    let app = TestApp::new();
    let x = app.seed_product("LAMP-X", 45.0, Some(50.0)).await;
    let y = app.seed_product("RUG-Y", 200.0, None).await;
    let (status, collection) = app
        .call(Method::POST, "/collections", Some(json!({"collectionName": "Antiques", "productIds": [x.id, y.id]})))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .call(
            Method::POST,
            "/discounts",
            Some(json!({"targetType": "collection", "targetId": collection["id"], "percentage": 10})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["report"]["attempted"], 2);
    assert_eq!(body["report"]["succeeded"], 1);
    assert_eq!(body["report"]["skipped"], 1);

    let x_after = app.product(x.id).await;
    assert_eq!((x_after.price, x_after.original_price), (45.0, Some(50.0)));
    let y_after = app.product(y.id).await;
    assert_eq!((y_after.price, y_after.original_price), (180.0, Some(200.0)));
}

#[tokio::test]
async fn test_out_of_range_percentage_rejected_without_mutation() {
    let app = TestApp::new();
    let product = app.seed_product("COPPER-POT", 60.0, None).await;

    for percentage in [150.0, -5.0] {
        let (status, body) = app
            .call(
                Method::POST,
                "/discounts",
                Some(json!({"targetType": "product", "targetId": product.id, "percentage": percentage})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("percentage"));
    }

    let stored = app.product(product.id).await;
    assert_eq!((stored.price, stored.original_price), (60.0, None));
    let (_, discounts) = app.get("/discounts").await;
    assert_eq!(discounts.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_missing_target_still_creates_record() {
    let app = TestApp::new();
    let missing = Uuid::now_v7();

    let (status, body) = app
        .call(Method::POST, "/discounts", Some(json!({"targetType": "product", "targetId": missing, "percentage": 15})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["report"]["succeeded"], 0);
    assert_eq!(body["discount"]["targetId"], missing.to_string());

    let (_, discounts) = app.get("/discounts").await;
    assert_eq!(discounts.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_reverts_previous_effect_before_applying() {
    let app = TestApp::new();
    let first = app.seed_product("KILIM-1", 100.0, None).await;
    let second = app.seed_product("KILIM-2", 50.0, None).await;

    let (_, created) = app
        .call(Method::POST, "/discounts", Some(json!({"targetType": "product", "targetId": first.id, "percentage": 20})))
        .await;
    let id = created["discount"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/discounts/{id}"),
            Some(json!({"targetType": "product", "targetId": second.id, "percentage": 50})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reverted"]["succeeded"], 1);
    assert_eq!(body["report"]["succeeded"], 1);

    let first_after = app.product(first.id).await;
    assert_eq!((first_after.price, first_after.original_price), (100.0, None));
    let second_after = app.product(second.id).await;
    assert_eq!((second_after.price, second_after.original_price), (25.0, Some(50.0)));
}

#[tokio::test]
async fn test_percentage_change_on_same_target_uses_original_price() {
    let app = TestApp::new();
    let product = app.seed_product("TEAPOT", 80.0, None).await;

    let (_, created) = app
        .call(Method::POST, "/discounts", Some(json!({"targetType": "product", "targetId": product.id, "percentage": 25})))
        .await;
    let id = created["discount"]["id"].as_str().unwrap().to_string();
    assert_eq!(app.product(product.id).await.price, 60.0);

    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/discounts/{id}"),
            Some(json!({"targetType": "product", "targetId": product.id, "percentage": 50})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let stored = app.product(product.id).await;
    assert_eq!((stored.price, stored.original_price), (40.0, Some(80.0)));
}

#[tokio::test]
async fn test_update_and_delete_of_unknown_discount_are_not_found() {
    let app = TestApp::new();
    let id = Uuid::now_v7();
    let body = json!({"targetType": "product", "targetId": Uuid::now_v7(), "percentage": 10});

    let (status, _) = app.call(Method::PUT, &format!("/discounts/{id}"), Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.call(Method::DELETE, &format!("/discounts/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_discount_bodies_are_bad_requests() {
    let app = TestApp::new();
    let target = Uuid::now_v7();

    let (status, _) = app
        .call(Method::POST, "/discounts", Some(json!({"targetType": "category", "targetId": target, "percentage": 10})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.call(Method::POST, "/discounts", Some(json!({"targetType": "product", "percentage": 10}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.call(Method::GET, "/discounts/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_discount_writes_require_a_token() {
    let app = TestApp::new();
    let product = app.seed_product("SAMOVAR", 300.0, None).await;
    let body = json!({"targetType": "product", "targetId": product.id, "percentage": 10});

    let (status, _) = app.call_as(None, Method::POST, "/discounts", Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.call_as(Some("garbage"), Method::POST, "/discounts", Some(body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.product(product.id).await.price, 300.0);
}

#[tokio::test]
async fn test_product_edit_keeps_discount_restorable() {
    let app = TestApp::new();
    let product = app.seed_product("LANTERN", 100.0, None).await;
    let (_, created) = app
        .call(Method::POST, "/discounts", Some(json!({"targetType": "product", "targetId": product.id, "percentage": 10})))
        .await;
    let id = created["discount"]["id"].as_str().unwrap().to_string();

    let (status, updated) = app
        .call(
            Method::PUT,
            &format!("/products/{}", product.id),
            Some(json!({"sku": "LANTERN", "title": "Brass lantern", "price": 85.0, "stock": 2})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["originalPrice"], 100.0);

    app.call(Method::DELETE, &format!("/discounts/{id}"), None).await;
    let stored = app.product(product.id).await;
    assert_eq!((stored.price, stored.original_price), (100.0, None));
}

#[tokio::test]
async fn test_deleting_collection_discount_keeps_product_discount() {
    let app = TestApp::new();
    let x = app.seed_product("EWER-X", 100.0, None).await;
    let y = app.seed_product("EWER-Y", 200.0, None).await;
    let sale = create_collection(&app, "Sale", &[x.id, y.id]).await;

    let (_, own) = app
        .call(Method::POST, "/discounts", Some(json!({"targetType": "product", "targetId": x.id, "percentage": 20})))
        .await;
    let own_id = own["discount"]["id"].as_str().unwrap().to_string();
    let (_, wide) = app
        .call(Method::POST, "/discounts", Some(json!({"targetType": "collection", "targetId": sale, "percentage": 10})))
        .await;
    assert_eq!(wide["report"]["skipped"], 1);
    let wide_id = wide["discount"]["id"].as_str().unwrap().to_string();

    let (status, report) = app.call(Method::DELETE, &format!("/discounts/{wide_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!((report["attempted"].as_u64(), report["succeeded"].as_u64()), (Some(2), Some(1)));

    let x_after = app.product(x.id).await;
    assert_eq!((x_after.price, x_after.original_price), (80.0, Some(100.0)));
    let y_after = app.product(y.id).await;
    assert_eq!((y_after.price, y_after.original_price), (200.0, None));

    let (status, _) = app.call(Method::DELETE, &format!("/discounts/{own_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let x_after = app.product(x.id).await;
    assert_eq!((x_after.price, x_after.original_price), (100.0, None));
}

#[tokio::test]
async fn test_collection_discount_update_and_delete_move_prices() {
    let app = TestApp::new();
    let a = app.seed_product("PLATE-A", 40.0, None).await;
    let b = app.seed_product("PLATE-B", 60.0, None).await;
    let c = app.seed_product("PLATE-C", 80.0, None).await;
    let first = create_collection(&app, "Plates", &[a.id, b.id]).await;
    let second = create_collection(&app, "Bowls", &[c.id]).await;

    let (_, created) = app
        .call(Method::POST, "/discounts", Some(json!({"targetType": "collection", "targetId": first, "percentage": 50})))
        .await;
    assert_eq!(created["report"]["succeeded"], 2);
    let id = created["discount"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/discounts/{id}"),
            Some(json!({"targetType": "collection", "targetId": second, "percentage": 25})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reverted"]["succeeded"], 2);
    assert_eq!(body["report"]["succeeded"], 1);
    assert_eq!(body["discount"]["targetId"], second);

    for (product, price) in [(&a, 40.0), (&b, 60.0)] {
        let stored = app.product(product.id).await;
        assert_eq!((stored.price, stored.original_price), (price, None));
    }
    let stored = app.product(c.id).await;
    assert_eq!((stored.price, stored.original_price), (60.0, Some(80.0)));

    let (status, report) = app.call(Method::DELETE, &format!("/discounts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["succeeded"], 1);
    let stored = app.product(c.id).await;
    assert_eq!((stored.price, stored.original_price), (80.0, None));
}

#[tokio::test]
async fn test_partial_revert_keeps_discount_record() {
    let backend = Arc::new(MemoryStore::new());
    let healthy = TestApp::with_stores(stores_over(&backend, backend.clone()));
    let a = healthy.seed_product("JUG-A", 10.0, None).await;
    let b = healthy.seed_product("JUG-B", 20.0, None).await;
    let jugs = create_collection(&healthy, "Jugs", &[a.id, b.id]).await;
    let (_, created) = healthy
        .call(Method::POST, "/discounts", Some(json!({"targetType": "collection", "targetId": jugs, "percentage": 50})))
        .await;
    let id = created["discount"]["id"].as_str().unwrap().to_string();

    let failing = FailingRestore { inner: backend.clone(), broken: b.id };
    let flaky = TestApp::with_stores(stores_over(&backend, Arc::new(failing)));
    let (status, _) = flaky.call(Method::DELETE, &format!("/discounts/{id}"), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (status, _) = flaky
        .call(Method::PUT, &format!("/discounts/{id}"), Some(json!({"targetType": "collection", "targetId": jugs, "percentage": 10})))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, record) = healthy.get(&format!("/discounts/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["percentage"], 50.0);
    let a_after = healthy.product(a.id).await;
    assert_eq!((a_after.price, a_after.original_price), (10.0, None));
    let b_after = healthy.product(b.id).await;
    assert_eq!((b_after.price, b_after.original_price), (10.0, Some(20.0)));

    let (status, report) = healthy.call(Method::DELETE, &format!("/discounts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!((report["succeeded"].as_u64(), report["skipped"].as_u64()), (Some(1), Some(1)));
    let b_after = healthy.product(b.id).await;
    assert_eq!((b_after.price, b_after.original_price), (20.0, None));
}
