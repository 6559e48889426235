pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod state;
pub mod types;

#[cfg(test)]
mod router_tests;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::jwt_auth_middleware;
use crate::config::AppConfig;
use crate::{account, courier, order, product, shop};
use state::AppState;

/// Build the full HTTP router.
///
/// Read-only catalogue routes are public; everything else requires a bearer JWT.
pub fn router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/auth/register", post(account::handlers::register))
        .route("/auth/login", post(account::handlers::login))
        .route("/shops", get(shop::handlers::list_shops))
        .route("/shops/{id}", get(shop::handlers::get_shop))
        .route(
            "/shops/{id}/products",
            get(shop::handlers::list_shop_products),
        )
        .route("/products", get(product::handlers::list_products))
        .route("/products/{id}", get(product::handlers::get_product))
        .route("/couriers", get(courier::handlers::list_couriers))
        .route("/couriers/{id}", get(courier::handlers::get_courier));

    let protected_routes = Router::new()
        // Accounts
        .route("/profile", get(account::handlers::profile))
        .route("/users", get(account::handlers::list_users))
        .route(
            "/users/{id}",
            get(account::handlers::get_user)
                .patch(account::handlers::update_user)
                .delete(account::handlers::delete_user),
        )
        // Catalogue writes
        .route("/shops", post(shop::handlers::create_shop))
        .route("/shops/{id}", patch(shop::handlers::update_shop))
        .route("/products", post(product::handlers::create_product))
        .route(
            "/products/{id}",
            patch(product::handlers::update_product).delete(product::handlers::delete_product),
        )
        .route("/couriers", post(courier::handlers::create_courier))
        .route(
            "/couriers/{id}",
            patch(courier::handlers::update_courier).delete(courier::handlers::delete_courier),
        )
        // Buyer orders
        .route(
            "/orders",
            post(order::handlers::create_order).get(order::handlers::list_orders),
        )
        .route("/orders/{id}", get(order::handlers::get_order))
        .route(
            "/orders/{id}/payment",
            patch(order::handlers::update_payment_status),
        )
        // Shop-side orders
        .route("/shop/orders", get(order::handlers::list_shop_orders))
        .route(
            "/shop/orders/{id}/status",
            patch(order::handlers::update_order_status),
        )
        .route(
            "/shop/orders/{id}/cancel",
            patch(order::handlers::cancel_order),
        )
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .nest("/api/v1", public_routes.merge(protected_routes))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(from_fn(middleware::request_log_middleware))
}

/// Bind and serve until Ctrl-C.
pub async fn run_server(config: &AppConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    use anyhow::Context;

    let storage = state.storage_kind();
    let app = router(state);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}; is the port already in use?"))?;

    tracing::info!(%addr, storage, "gateway listening");
    tracing::info!("API docs: http://{addr}/docs");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
