use axum::{
    Extension,
    extract::{Path, State},
};
use std::sync::Arc;

use super::models::{CreateOrderRequest, Order, UpdatePaymentRequest, UpdateStatusRequest};
use crate::auth::AuthenticatedUser;
use crate::core_types::OrderId;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, ApiResult, ValidJson, created, ok};

/// Place an order
///
/// POST /api/v1/orders
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<Order>),
        (status = 400, description = "Invalid items, foreign product or insufficient stock"),
        (status = 403, description = "Caller is not a general user"),
        (status = 404, description = "Shop, courier or product not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    ValidJson(req): ValidJson<CreateOrderRequest>,
) -> ApiResult<Order> {
    created(state.orders.create_order(&caller, req).await?)
}

/// Caller's orders, newest first
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "Orders", body = ApiResponse<Vec<Order>>),
        (status = 403, description = "Caller is not a general user")
    ),
    security(("bearer_jwt" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<Order>> {
    ok(state.orders.list_orders(&caller).await?)
}

/// Order with items (buyer or shop owner)
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = ApiResponse<Order>),
        (status = 403, description = "Not the buyer or the shop owner"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<OrderId>,
) -> ApiResult<Order> {
    ok(state.orders.get_order(&caller, id).await?)
}

/// Update payment status (buyer)
#[utoipa::path(
    patch,
    path = "/api/v1/orders/{id}/payment",
    params(("id" = i64, Path, description = "Order ID")),
    request_body = UpdatePaymentRequest,
    responses(
        (status = 200, description = "Updated order", body = ApiResponse<Order>),
        (status = 400, description = "Unknown status or transition not allowed"),
        (status = 403, description = "Not the buyer"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Concurrent update")
    ),
    security(("bearer_jwt" = [])),
    tag = "Orders"
)]
pub async fn update_payment_status(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<OrderId>,
    ValidJson(req): ValidJson<UpdatePaymentRequest>,
) -> ApiResult<Order> {
    ok(state
        .orders
        .update_payment_status(&caller, id, &req.payment_status)
        .await?)
}

/// Orders of the caller's shop
#[utoipa::path(
    get,
    path = "/api/v1/shop/orders",
    responses(
        (status = 200, description = "Orders", body = ApiResponse<Vec<Order>>),
        (status = 403, description = "Caller is not a shop user"),
        (status = 404, description = "Caller has no shop")
    ),
    security(("bearer_jwt" = [])),
    tag = "Shop Orders"
)]
pub async fn list_shop_orders(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<Order>> {
    ok(state.orders.list_shop_orders(&caller).await?)
}

/// Update fulfillment status (shop owner)
#[utoipa::path(
    patch,
    path = "/api/v1/shop/orders/{id}/status",
    params(("id" = i64, Path, description = "Order ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated order", body = ApiResponse<Order>),
        (status = 400, description = "Unknown status or transition not allowed"),
        (status = 403, description = "Not the shop owner"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Concurrent update")
    ),
    security(("bearer_jwt" = [])),
    tag = "Shop Orders"
)]
pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<OrderId>,
    ValidJson(req): ValidJson<UpdateStatusRequest>,
) -> ApiResult<Order> {
    ok(state.orders.update_status(&caller, id, &req.status).await?)
}

/// Cancel an order (shop owner)
#[utoipa::path(
    patch,
    path = "/api/v1/shop/orders/{id}/cancel",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Cancelled order", body = ApiResponse<Order>),
        (status = 400, description = "Order already delivered"),
        (status = 403, description = "Not the shop owner"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Shop Orders"
)]
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<OrderId>,
) -> ApiResult<Order> {
    ok(state.orders.cancel_order(&caller, id).await?)
}
