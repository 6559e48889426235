//! HTTP-level tests driving the full router with `oneshot`.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::router;
use super::state::AppState;
use super::types::error_codes;
use crate::account::UserCache;
use crate::auth::TokenService;
use crate::events::event_channel;
use crate::store::Repositories;

const ADMIN_EMAIL: &str = "admin@storefront.test";
const ADMIN_PASSWORD: &str = "admin-password";

async fn test_app() -> Router {
    let cache = Arc::new(UserCache::new());
    let (events, worker) = event_channel(1024, cache.clone());
    tokio::spawn(worker.run());
    let tokens = Arc::new(TokenService::new("router-test-secret", 1));
    let state = AppState::new(Repositories::memory(), cache, events, tokens, None);
    state
        .users
        .ensure_admin(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .unwrap();
    router(Arc::new(state))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn register_and_login(app: &Router, email: &str, role: &str) -> String {
    let (status, _) = call(
        app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({
            "first_name": "Test",
            "last_name": "User",
            "email": email,
            "password": "password123",
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    login(app, email, "password123").await
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = call(
        app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_health_reports_memory_storage() {
    let app = test_app().await;
    let (status, body) = call(&app, "GET", "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], error_codes::SUCCESS);
    assert_eq!(body["data"]["storage"], "memory");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = test_app().await;

    let (status, body) = call(&app, "GET", "/api/v1/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], error_codes::MISSING_AUTH);

    let (status, body) = call(&app, "GET", "/api/v1/profile", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], error_codes::AUTH_FAILED);

    // catalogue reads stay public
    let (status, _) = call(&app, "GET", "/api/v1/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_echoed() {
    let app = test_app().await;
    let request = Request::builder()
        .uri("/api/v1/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_invalid_body_is_validation_error() {
    let app = test_app().await;
    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({ "first_name": "", "last_name": "X", "email": "nope", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], error_codes::INVALID_PARAMETER);
}

#[tokio::test]
async fn test_full_purchase_flow() {
    let app = test_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let seller = register_and_login(&app, "seller@example.com", "shop").await;
    let buyer = register_and_login(&app, "buyer@example.com", "general").await;

    let (status, shop) = call(
        &app,
        "POST",
        "/api/v1/shops",
        Some(&seller),
        Some(json!({ "name": "Baan Coffee" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let shop_id = shop["data"]["id"].as_i64().unwrap();

    let (status, _) = call(
        &app,
        "POST",
        "/api/v1/shops",
        Some(&seller),
        Some(json!({ "name": "Second" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, product) = call(
        &app,
        "POST",
        "/api/v1/products",
        Some(&seller),
        Some(json!({ "name": "Beans", "price": "100.00", "stock": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = product["data"]["id"].as_i64().unwrap();

    let (status, _) = call(
        &app,
        "POST",
        "/api/v1/couriers",
        Some(&seller),
        Some(json!({ "brand": "Kerry", "employer_name": "Kerry", "shipping_cost": "20.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, courier) = call(
        &app,
        "POST",
        "/api/v1/couriers",
        Some(&admin),
        Some(json!({ "brand": "Kerry", "employer_name": "Kerry", "shipping_cost": "20.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let courier_id = courier["data"]["id"].as_i64().unwrap();

    let order_body = |quantity: i32| {
        json!({
            "shop_id": shop_id,
            "courier_id": courier_id,
            "items": [{ "product_id": product_id, "quantity": quantity }],
        })
    };

    let (status, body) = call(&app, "POST", "/api/v1/orders", Some(&buyer), Some(order_body(6))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], error_codes::INVALID_PARAMETER);

    let (status, order) = call(&app, "POST", "/api/v1/orders", Some(&buyer), Some(order_body(2))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(decimal(&order["data"]["total"]), Decimal::new(220, 0));
    assert_eq!(order["data"]["status"], "pending");
    let order_id = order["data"]["id"].as_i64().unwrap();

    let (_, product) = call(&app, "GET", &format!("/api/v1/products/{product_id}"), None, None).await;
    assert_eq!(product["data"]["stock"], 3);

    // admin cannot read orders
    let (status, _) = call(&app, "GET", &format!("/api/v1/orders/{order_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, shop_orders) = call(&app, "GET", "/api/v1/shop/orders", Some(&seller), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shop_orders["data"].as_array().unwrap().len(), 1);

    let (status, shipped) = call(
        &app,
        "PATCH",
        &format!("/api/v1/shop/orders/{order_id}/status"),
        Some(&seller),
        Some(json!({ "status": "shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shipped["data"]["status"], "shipped");

    let (status, _) = call(
        &app,
        "PATCH",
        &format!("/api/v1/orders/{order_id}/payment"),
        Some(&seller),
        Some(json!({ "payment_status": "complete" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, paid) = call(
        &app,
        "PATCH",
        &format!("/api/v1/orders/{order_id}/payment"),
        Some(&buyer),
        Some(json!({ "payment_status": "complete" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["data"]["payment_status"], "complete");

    let (status, _) = call(
        &app,
        "PATCH",
        &format!("/api/v1/shop/orders/{order_id}/status"),
        Some(&seller),
        Some(json!({ "status": "delivered" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // delivered is terminal
    let (status, _) = call(
        &app,
        "PATCH",
        &format!("/api/v1/shop/orders/{order_id}/cancel"),
        Some(&seller),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_resources_are_not_found() {
    let app = test_app().await;
    let buyer = register_and_login(&app, "lost@example.com", "general").await;

    let (status, body) = call(&app, "GET", "/api/v1/shops/9999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], error_codes::NOT_FOUND);

    let (status, _) = call(&app, "GET", "/api/v1/orders/9999", Some(&buyer), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
