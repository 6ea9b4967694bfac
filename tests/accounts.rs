mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use common::TestApp;

fn signup_body(email: &str) -> Value {
    json!({
        "firstName": "Layla",
        "lastName": "Haddad",
        "email": email,
        "password": "Souq!Pass2024",
        "phoneNumber": "+96171123456",
        "location": "Beirut"
    })
}

#[tokio::test]
async fn test_signup_then_login() {
    let app = TestApp::new();
    let (status, body) = app.call_as(None, Method::POST, "/signup", Some(signup_body("layla@example.com"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].as_str().unwrap().len() > 20);
    assert_eq!(body["user"]["email"], "layla@example.com");
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password").is_none());

    let (status, login) = app
        .call_as(None, Method::POST, "/login", Some(json!({"email": "layla@example.com", "password": "Souq!Pass2024"})))
        .await;
    assert_eq!(status, StatusCode::OK);

    let token = login["token"].as_str().unwrap();
    let (status, _) = app.call_as(Some(token), Method::GET, "/wishlist", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_signup_rejections() {
    let app = TestApp::new();
    let (status, _) = app.call_as(None, Method::POST, "/signup", Some(signup_body("dup@example.com"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.call_as(None, Method::POST, "/signup", Some(signup_body("dup@example.com"))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let mut weak = signup_body("weak@example.com");
    weak["password"] = json!("password");
    let (status, body) = app.call_as(None, Method::POST, "/signup", Some(weak)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Password"));

    let mut foreign = signup_body("foreign@example.com");
    foreign["phoneNumber"] = json!("+33612345678");
    let (status, _) = app.call_as(None, Method::POST, "/signup", Some(foreign)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.call_as(None, Method::POST, "/signup", Some(signup_body("not-an-email"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_are_unauthorized() {
    let app = TestApp::new();
    app.call_as(None, Method::POST, "/signup", Some(signup_body("sami@example.com"))).await;

    let (status, _) = app
        .call_as(None, Method::POST, "/login", Some(json!({"email": "sami@example.com", "password": "Wrong!Pass99"})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app
        .call_as(None, Method::POST, "/login", Some(json!({"email": "nobody@example.com", "password": "Souq!Pass2024"})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cart_flow() {
    let app = TestApp::new();
    let product = app.seed_product("CART-1", 12.5, None).await;

    let (status, _) = app.call(Method::GET, "/cart", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.call(Method::POST, "/cart/items", Some(json!({"productId": product.id, "quantity": 0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.call(Method::POST, "/cart/items", Some(json!({"productId": product.id, "quantity": 2}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, cart) = app.call(Method::POST, "/cart/items", Some(json!({"productId": product.id, "quantity": 3}))).await;
    assert_eq!(cart["items"], json!([{"productId": product.id, "quantity": 5}]));

    let (status, cart) =
        app.call(Method::PUT, &format!("/cart/items/{}", product.id), Some(json!({"quantity": 1}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"][0]["quantity"], 1);

    let (status, _) =
        app.call(Method::PUT, &format!("/cart/items/{}", Uuid::now_v7()), Some(json!({"quantity": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, cart) = app.call(Method::PUT, &format!("/cart/items/{}", product.id), Some(json!({"quantity": 0}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"], json!([]));

    let (status, _) = app.call(Method::DELETE, &format!("/cart/items/{}", product.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.call_as(None, Method::GET, "/cart", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wishlist_flow() {
    let app = TestApp::new();
    let product = app.seed_product("WISH-1", 99.0, None).await;

    let (status, items) = app.call(Method::GET, "/wishlist", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items, json!([]));

    let (status, item) = app.call(Method::POST, "/wishlist/items", Some(json!({"productId": product.id}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["productId"], product.id.to_string());

    let item_id = item["id"].as_str().unwrap().to_string();
    let (status, _) = app.call(Method::DELETE, &format!("/wishlist/items/{item_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call(Method::DELETE, &format!("/wishlist/items/{item_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_flow() {
    let app = TestApp::new();
    let product = app.seed_product("ORDER-1", 30.0, None).await;
    let order = json!({
        "phoneNumber": "0096171123456",
        "userLocation": "Tripoli",
        "items": [{"productId": product.id, "quantity": 2}],
        "subtotal": 60.0,
        "total": 60.0,
        "discounted": false
    });

    let (status, created) = app.call(Method::POST, "/orders", Some(order.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["orderId"].as_str().unwrap().starts_with("OS"));
    let id = created["id"].as_str().unwrap().to_string();

    let mut revised = order.clone();
    revised["userLocation"] = json!("Byblos");
    let (status, updated) = app.call(Method::PUT, &format!("/orders/{id}"), Some(revised)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["userLocation"], "Byblos");

    let (_, listed) = app.call(Method::GET, "/orders", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = app.call(Method::DELETE, &format!("/orders/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call(Method::GET, &format!("/orders/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut empty = order;
    empty["items"] = json!([]);
    let (status, _) = app.call(Method::POST, "/orders", Some(empty)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_profile_update_requires_all_fields() {
    let app = TestApp::new();
    let (_, signed_up) = app.call_as(None, Method::POST, "/signup", Some(signup_body("nour@example.com"))).await;
    let id = signed_up["user"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .call(Method::PUT, &format!("/users/{id}"), Some(json!({"firstName": "Nour", "email": "nour@example.com"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut profile = signup_body("nour@example.com");
    profile["location"] = json!("Sidon");
    let (status, updated) = app.call(Method::PUT, &format!("/users/{id}"), Some(profile)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["location"], "Sidon");

    let (status, _) = app.call(Method::DELETE, &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call(Method::GET, &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
