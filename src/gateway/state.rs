use std::sync::Arc;

use crate::account::{UserCache, UserService};
use crate::auth::TokenService;
use crate::courier::CourierService;
use crate::db::Database;
use crate::events::EventPublisher;
use crate::order::OrderService;
use crate::product::ProductService;
use crate::shop::ShopService;
use crate::store::Repositories;

/// Gateway shared state
pub struct AppState {
    pub users: Arc<UserService>,
    pub shops: Arc<ShopService>,
    pub products: Arc<ProductService>,
    pub couriers: Arc<CourierService>,
    pub orders: Arc<OrderService>,
    pub tokens: Arc<TokenService>,
    /// `None` when running on the in-memory store
    pub db: Option<Arc<Database>>,
}

impl AppState {
    /// Wire every service over one repository bundle.
    pub fn new(
        repos: Repositories,
        cache: Arc<UserCache>,
        events: EventPublisher,
        tokens: Arc<TokenService>,
        db: Option<Arc<Database>>,
    ) -> Self {
        Self {
            users: Arc::new(UserService::new(
                repos.users.clone(),
                cache,
                events.clone(),
                tokens.clone(),
            )),
            shops: Arc::new(ShopService::new(repos.shops.clone(), events.clone())),
            products: Arc::new(ProductService::new(
                repos.products.clone(),
                repos.shops.clone(),
                events.clone(),
            )),
            couriers: Arc::new(CourierService::new(repos.couriers.clone())),
            orders: Arc::new(OrderService::new(
                repos.orders,
                repos.shops,
                repos.products,
                repos.couriers,
                repos.users,
                events,
            )),
            tokens,
            db,
        }
    }

    pub fn storage_kind(&self) -> &'static str {
        if self.db.is_some() { "postgres" } else { "memory" }
    }
}
