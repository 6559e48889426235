use axum::{
    Extension,
    extract::{Path, State},
};
use std::sync::Arc;

use super::models::{CreateProductRequest, Product, ProductPatch};
use crate::auth::AuthenticatedUser;
use crate::core_types::ProductId;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, ApiResult, Deleted, ValidJson, created, ok};

#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses((status = 200, description = "All products", body = ApiResponse<Vec<Product>>)),
    tag = "Products"
)]
pub async fn list_products(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Product>> {
    ok(state.products.list_products().await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ProductId>,
) -> ApiResult<Product> {
    ok(state.products.get_product(id).await?)
}

/// Create a product in the caller's shop
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<Product>),
        (status = 400, description = "Invalid price or stock"),
        (status = 403, description = "Caller is not a shop user"),
        (status = 404, description = "Caller has no shop")
    ),
    security(("bearer_jwt" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    ValidJson(req): ValidJson<CreateProductRequest>,
) -> ApiResult<Product> {
    created(state.products.create_product(&caller, req).await?)
}

#[utoipa::path(
    patch,
    path = "/api/v1/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    request_body = ProductPatch,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>),
        (status = 403, description = "Product belongs to another shop"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<ProductId>,
    ValidJson(patch): ValidJson<ProductPatch>,
) -> ApiResult<Product> {
    ok(state.products.update_product(&caller, id, patch).await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<Deleted>),
        (status = 403, description = "Product belongs to another shop"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product is referenced by orders")
    ),
    security(("bearer_jwt" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<ProductId>,
) -> ApiResult<Deleted> {
    state.products.delete_product(&caller, id).await?;
    ok(Deleted { id })
}
