use axum::{
    Extension,
    extract::{Path, State},
};
use std::sync::Arc;

use super::models::{Courier, CourierPatch, CreateCourierRequest};
use crate::auth::AuthenticatedUser;
use crate::core_types::CourierId;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, ApiResult, Deleted, ValidJson, created, ok};

#[utoipa::path(
    get,
    path = "/api/v1/couriers",
    responses((status = 200, description = "All couriers", body = ApiResponse<Vec<Courier>>)),
    tag = "Couriers"
)]
pub async fn list_couriers(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Courier>> {
    ok(state.couriers.list_couriers().await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/couriers/{id}",
    params(("id" = i64, Path, description = "Courier ID")),
    responses(
        (status = 200, description = "Courier", body = ApiResponse<Courier>),
        (status = 404, description = "Courier not found")
    ),
    tag = "Couriers"
)]
pub async fn get_courier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<CourierId>,
) -> ApiResult<Courier> {
    ok(state.couriers.get_courier(id).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/couriers",
    request_body = CreateCourierRequest,
    responses(
        (status = 201, description = "Courier created", body = ApiResponse<Courier>),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer_jwt" = [])),
    tag = "Couriers"
)]
pub async fn create_courier(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    ValidJson(req): ValidJson<CreateCourierRequest>,
) -> ApiResult<Courier> {
    created(state.couriers.create_courier(&caller, req).await?)
}

#[utoipa::path(
    patch,
    path = "/api/v1/couriers/{id}",
    params(("id" = i64, Path, description = "Courier ID")),
    request_body = CourierPatch,
    responses(
        (status = 200, description = "Updated courier", body = ApiResponse<Courier>),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Courier not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Couriers"
)]
pub async fn update_courier(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<CourierId>,
    ValidJson(patch): ValidJson<CourierPatch>,
) -> ApiResult<Courier> {
    ok(state.couriers.update_courier(&caller, id, patch).await?)
}

#[utoipa::path(
    delete,
    path = "/api/v1/couriers/{id}",
    params(("id" = i64, Path, description = "Courier ID")),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<Deleted>),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Courier not found"),
        (status = 409, description = "Courier is referenced by orders")
    ),
    security(("bearer_jwt" = [])),
    tag = "Couriers"
)]
pub async fn delete_courier(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<CourierId>,
) -> ApiResult<Deleted> {
    state.couriers.delete_courier(&caller, id).await?;
    ok(Deleted { id })
}
