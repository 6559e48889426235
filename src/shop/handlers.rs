use axum::{
    Extension,
    extract::{Path, State},
};
use std::sync::Arc;

use super::models::{CreateShopRequest, Shop, ShopPatch};
use crate::auth::AuthenticatedUser;
use crate::core_types::ShopId;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, ApiResult, ValidJson, created, ok};
use crate::product::Product;

/// Open a shop owned by the caller
#[utoipa::path(
    post,
    path = "/api/v1/shops",
    request_body = CreateShopRequest,
    responses(
        (status = 201, description = "Shop created", body = ApiResponse<Shop>),
        (status = 403, description = "Caller is not a shop user"),
        (status = 409, description = "Caller already owns a shop")
    ),
    security(("bearer_jwt" = [])),
    tag = "Shops"
)]
pub async fn create_shop(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    ValidJson(req): ValidJson<CreateShopRequest>,
) -> ApiResult<Shop> {
    created(state.shops.create_shop(&caller, req).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/shops",
    responses((status = 200, description = "All shops", body = ApiResponse<Vec<Shop>>)),
    tag = "Shops"
)]
pub async fn list_shops(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Shop>> {
    ok(state.shops.list_shops().await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/shops/{id}",
    params(("id" = i64, Path, description = "Shop ID")),
    responses(
        (status = 200, description = "Shop", body = ApiResponse<Shop>),
        (status = 404, description = "Shop not found")
    ),
    tag = "Shops"
)]
pub async fn get_shop(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ShopId>,
) -> ApiResult<Shop> {
    ok(state.shops.get_shop(id).await?)
}

/// Patch a shop (owner only)
#[utoipa::path(
    patch,
    path = "/api/v1/shops/{id}",
    params(("id" = i64, Path, description = "Shop ID")),
    request_body = ShopPatch,
    responses(
        (status = 200, description = "Updated shop", body = ApiResponse<Shop>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Shop not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Shops"
)]
pub async fn update_shop(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<ShopId>,
    ValidJson(patch): ValidJson<ShopPatch>,
) -> ApiResult<Shop> {
    ok(state.shops.update_shop(&caller, id, patch).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/shops/{id}/products",
    params(("id" = i64, Path, description = "Shop ID")),
    responses(
        (status = 200, description = "Products of the shop", body = ApiResponse<Vec<Product>>),
        (status = 404, description = "Shop not found")
    ),
    tag = "Shops"
)]
pub async fn list_shop_products(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ShopId>,
) -> ApiResult<Vec<Product>> {
    ok(state.products.list_by_shop(id).await?)
}
