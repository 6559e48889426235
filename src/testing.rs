//! Service-level test harness over the in-memory store.

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;

use crate::account::{NewUser, Role, UserCache, UserService};
use crate::auth::{AuthenticatedUser, TokenService};
use crate::core_types::Address;
use crate::courier::{Courier, CourierService, CreateCourierRequest};
use crate::events::{EventWorker, event_channel};
use crate::order::OrderService;
use crate::product::{NewProduct, Product, ProductService};
use crate::shop::{NewShop, Shop, ShopService};
use crate::store::{MemoryStore, Repositories};

pub struct TestWorld {
    pub repos: Repositories,
    pub cache: Arc<UserCache>,
    pub tokens: Arc<TokenService>,
    pub users: UserService,
    pub shops: ShopService,
    pub products: ProductService,
    pub couriers: CourierService,
    pub orders: OrderService,
    worker: Mutex<EventWorker>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::with_repos(Repositories::from_memory(Arc::new(MemoryStore::new())))
    }

    pub fn with_repos(repos: Repositories) -> Self {
        let cache = Arc::new(UserCache::new());
        let (events, worker) = event_channel(1024, cache.clone());
        let tokens = Arc::new(TokenService::new("test-secret", 1));
        Self {
            users: UserService::new(
                repos.users.clone(),
                cache.clone(),
                events.clone(),
                tokens.clone(),
            ),
            shops: ShopService::new(repos.shops.clone(), events.clone()),
            products: ProductService::new(
                repos.products.clone(),
                repos.shops.clone(),
                events.clone(),
            ),
            couriers: CourierService::new(repos.couriers.clone()),
            orders: OrderService::new(
                repos.orders.clone(),
                repos.shops.clone(),
                repos.products.clone(),
                repos.couriers.clone(),
                repos.users.clone(),
                events,
            ),
            worker: Mutex::new(worker),
            repos,
            cache,
            tokens,
        }
    }

    /// Process queued domain events.
    pub fn drain_events(&self) -> usize {
        self.worker.lock().unwrap().drain_pending()
    }

    pub async fn add_user(&self, role: Role) -> AuthenticatedUser {
        let user = self
            .repos
            .users
            .create(NewUser {
                first_name: "Test".into(),
                last_name: role.as_str().into(),
                email: format!("{}-{}@example.com", role, uuid::Uuid::new_v4()),
                phone: String::new(),
                address: Address::default(),
                password_hash: "unused".into(),
                role,
            })
            .await
            .unwrap();
        AuthenticatedUser {
            user_id: user.id,
            role: user.role,
        }
    }

    /// A fresh shop-role user and the shop they own.
    pub async fn add_shop(&self) -> (AuthenticatedUser, Shop) {
        let owner = self.add_user(Role::Shop).await;
        let shop = self
            .repos
            .shops
            .create(NewShop {
                owner_id: owner.user_id,
                name: format!("Shop of {}", owner.user_id),
                address: Address::default(),
            })
            .await
            .unwrap();
        (owner, shop)
    }

    pub async fn add_product(&self, shop: &Shop, price: Decimal, stock: i32) -> Product {
        self.repos
            .products
            .create(NewProduct {
                shop_id: shop.id,
                name: "Item".into(),
                price,
                stock,
            })
            .await
            .unwrap()
    }

    pub async fn add_courier(&self, shipping_cost: Decimal) -> Courier {
        self.repos
            .couriers
            .create(CreateCourierRequest {
                brand: "Kerry".into(),
                employer_name: "Kerry Express".into(),
                phone: String::new(),
                shipping_cost,
            })
            .await
            .unwrap()
    }

    pub async fn stock_of(&self, product: &Product) -> i32 {
        self.repos
            .products
            .find_by_id(product.id)
            .await
            .unwrap()
            .unwrap()
            .stock
    }
}
