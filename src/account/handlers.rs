use axum::{
    Extension,
    extract::{Path, State},
};
use std::sync::Arc;

use super::models::{AuthResponse, LoginRequest, RegisterRequest, UserPatch, UserView};
use crate::auth::AuthenticatedUser;
use crate::core_types::UserId;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, ApiResult, Deleted, ValidJson, created, ok};

/// Register a new user
///
/// POST /api/v1/auth/register
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<UserView>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already in use")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> ApiResult<UserView> {
    created(state.users.register(req).await?)
}

/// Login user
///
/// POST /api/v1/auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<AuthResponse> {
    ok(state.users.login(req).await?)
}

/// Caller's own profile
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile", body = ApiResponse<UserView>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> ApiResult<UserView> {
    ok(state.users.profile(&caller).await?)
}

/// List all users (admin)
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = ApiResponse<Vec<UserView>>),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<UserView>> {
    ok(state.users.list_users(&caller).await?)
}

/// Get a user (self or admin)
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = ApiResponse<UserView>),
        (status = 403, description = "Not this user and not an admin"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<UserId>,
) -> ApiResult<UserView> {
    ok(state.users.view_user(&caller, id).await?)
}

/// Patch a user profile (self or admin; role by admin only)
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UserPatch,
    responses(
        (status = 200, description = "Updated user", body = ApiResponse<UserView>),
        (status = 400, description = "Invalid or empty patch"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<UserId>,
    ValidJson(patch): ValidJson<UserPatch>,
) -> ApiResult<UserView> {
    ok(state.users.update_user(&caller, id, patch).await?)
}

/// Delete a user (admin)
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<Deleted>),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "User not found"),
        (status = 409, description = "User still owns a shop or orders")
    ),
    security(("bearer_jwt" = [])),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<UserId>,
) -> ApiResult<Deleted> {
    state.users.delete_user(&caller, id).await?;
    ok(Deleted { id })
}
