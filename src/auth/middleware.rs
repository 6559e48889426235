use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::gateway::{
    state::AppState,
    types::{ApiResponse, error_codes},
};

type Rejection = (StatusCode, Json<ApiResponse<()>>);

fn unauthorized(code: i32, msg: &str) -> Rejection {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(code, msg)),
    )
}

/// Require `Authorization: Bearer <jwt>` and inject [`super::AuthenticatedUser`].
pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Rejection> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| unauthorized(error_codes::MISSING_AUTH, "Missing Authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized(error_codes::AUTH_FAILED, "Invalid token format"))?;

    match state.tokens.verify(token) {
        Ok(user) => {
            tracing::Span::current().record("user_id", user.user_id);
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        Err(_) => Err(unauthorized(
            error_codes::AUTH_FAILED,
            "Invalid or expired token",
        )),
    }
}
