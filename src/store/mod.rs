//! Repository bundles.
//!
//! [`Repositories::postgres`] is the production wiring; [`Repositories::memory`]
//! backs every trait with one shared [`MemoryStore`].

pub mod memory;

use std::sync::Arc;

use sqlx::PgPool;

use crate::account::{PgUserRepository, UserRepository};
use crate::courier::{CourierRepository, PgCourierRepository};
use crate::order::{OrderRepository, PgOrderRepository};
use crate::product::{PgProductRepository, ProductRepository};
use crate::shop::{PgShopRepository, ShopRepository};

pub use memory::MemoryStore;

#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub shops: Arc<dyn ShopRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub couriers: Arc<dyn CourierRepository>,
    pub orders: Arc<dyn OrderRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            shops: Arc::new(PgShopRepository::new(pool.clone())),
            products: Arc::new(PgProductRepository::new(pool.clone())),
            couriers: Arc::new(PgCourierRepository::new(pool.clone())),
            orders: Arc::new(PgOrderRepository::new(pool)),
        }
    }

    pub fn memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            shops: store.clone(),
            products: store.clone(),
            couriers: store.clone(),
            orders: store,
        }
    }
}
