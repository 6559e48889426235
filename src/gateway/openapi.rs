//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::account::{AuthResponse, LoginRequest, RegisterRequest, Role, UserPatch, UserView};
use crate::core_types::Address;
use crate::courier::{Courier, CourierPatch, CreateCourierRequest};
use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::Deleted;
use crate::order::{
    CreateOrderRequest, Order, OrderItem, OrderItemRequest, OrderStatus, PaymentStatus,
    UpdatePaymentRequest, UpdateStatusRequest,
};
use crate::product::{CreateProductRequest, Product, ProductPatch};
use crate::shop::{CreateShopRequest, Shop, ShopPatch};

/// Bearer JWT issued by `/api/v1/auth/login`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Authorization: Bearer <token from /auth/login>"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "1.0.0",
        description = "Multi-tenant storefront: users, shops, products, couriers and orders.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        // Accounts
        crate::account::handlers::register,
        crate::account::handlers::login,
        crate::account::handlers::profile,
        crate::account::handlers::list_users,
        crate::account::handlers::get_user,
        crate::account::handlers::update_user,
        crate::account::handlers::delete_user,
        // Shops
        crate::shop::handlers::create_shop,
        crate::shop::handlers::list_shops,
        crate::shop::handlers::get_shop,
        crate::shop::handlers::update_shop,
        crate::shop::handlers::list_shop_products,
        // Products
        crate::product::handlers::list_products,
        crate::product::handlers::get_product,
        crate::product::handlers::create_product,
        crate::product::handlers::update_product,
        crate::product::handlers::delete_product,
        // Couriers
        crate::courier::handlers::list_couriers,
        crate::courier::handlers::get_courier,
        crate::courier::handlers::create_courier,
        crate::courier::handlers::update_courier,
        crate::courier::handlers::delete_courier,
        // Orders
        crate::order::handlers::create_order,
        crate::order::handlers::list_orders,
        crate::order::handlers::get_order,
        crate::order::handlers::update_payment_status,
        crate::order::handlers::list_shop_orders,
        crate::order::handlers::update_order_status,
        crate::order::handlers::cancel_order,
    ),
    components(
        schemas(
            HealthResponse,
            Deleted,
            Address,
            Role,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UserView,
            UserPatch,
            Shop,
            CreateShopRequest,
            ShopPatch,
            Product,
            CreateProductRequest,
            ProductPatch,
            Courier,
            CreateCourierRequest,
            CourierPatch,
            Order,
            OrderItem,
            OrderStatus,
            PaymentStatus,
            CreateOrderRequest,
            OrderItemRequest,
            UpdateStatusRequest,
            UpdatePaymentRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "Profiles and user administration"),
        (name = "Shops", description = "Shops and their catalogue"),
        (name = "Products", description = "Products and stock"),
        (name = "Couriers", description = "Carriers (admin managed)"),
        (name = "Orders", description = "Buyer-side orders"),
        (name = "Shop Orders", description = "Shop-side fulfillment"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
