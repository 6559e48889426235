//! In-memory implementation of every repository trait.
//!
//! All tables live behind one mutex, so each trait method is atomic. The
//! store mirrors the PostgreSQL constraints that services rely on: unique
//! email, one shop per owner, foreign keys and non-negative stock.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::account::{NewUser, User, UserPatch, UserRepository};
use crate::core_types::{CourierId, OrderId, ProductId, ShopId, UserId};
use crate::courier::{Courier, CourierPatch, CourierRepository, CreateCourierRequest};
use crate::db::Patch;
use crate::error::{AppError, AppResult};
use crate::order::{NewOrder, Order, OrderItem, OrderRepository, OrderStatus, PaymentStatus};
use crate::product::{NewProduct, Product, ProductPatch, ProductRepository};
use crate::shop::{NewShop, Shop, ShopPatch, ShopRepository};

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<UserId, User>,
    shops: BTreeMap<ShopId, Shop>,
    products: BTreeMap<ProductId, Product>,
    couriers: BTreeMap<CourierId, Courier>,
    orders: BTreeMap<OrderId, Order>,
    next_id: i64,
}

impl MemoryState {
    /// One sequence for every table; ids never repeat.
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn ensure_patch(patch: &dyn Patch) -> AppResult<()> {
    if patch.is_empty() {
        return Err(AppError::validation("no fields to update"));
    }
    Ok(())
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut state = self.state();
        if state.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("email already in use".to_string()));
        }
        let now = Utc::now();
        let user = User {
            id: state.next_id(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
            address: user.address,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.state().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .state()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.state().users.values().cloned().collect())
    }

    async fn update(&self, id: UserId, patch: &UserPatch) -> AppResult<Option<User>> {
        ensure_patch(patch)?;
        let mut state = self.state();
        Ok(state.users.get_mut(&id).map(|user| {
            patch.apply(user);
            user.clone()
        }))
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        let mut state = self.state();
        if state.shops.values().any(|s| s.owner_id == id)
            || state.orders.values().any(|o| o.user_id == id)
        {
            return Err(AppError::still_referenced());
        }
        Ok(state.users.remove(&id).is_some())
    }
}

#[async_trait]
impl ShopRepository for MemoryStore {
    async fn create(&self, shop: NewShop) -> AppResult<Shop> {
        let mut state = self.state();
        if !state.users.contains_key(&shop.owner_id) {
            return Err(AppError::missing_reference());
        }
        if state.shops.values().any(|s| s.owner_id == shop.owner_id) {
            return Err(AppError::Conflict(
                "shop for this user already exists".to_string(),
            ));
        }
        let now = Utc::now();
        let shop = Shop {
            id: state.next_id(),
            owner_id: shop.owner_id,
            name: shop.name,
            address: shop.address,
            created_at: now,
            updated_at: now,
        };
        state.shops.insert(shop.id, shop.clone());
        Ok(shop)
    }

    async fn find_by_id(&self, id: ShopId) -> AppResult<Option<Shop>> {
        Ok(self.state().shops.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner_id: UserId) -> AppResult<Option<Shop>> {
        Ok(self
            .state()
            .shops
            .values()
            .find(|s| s.owner_id == owner_id)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<Shop>> {
        Ok(self.state().shops.values().cloned().collect())
    }

    async fn update(&self, id: ShopId, patch: &ShopPatch) -> AppResult<Option<Shop>> {
        ensure_patch(patch)?;
        let mut state = self.state();
        Ok(state.shops.get_mut(&id).map(|shop| {
            patch.apply(shop);
            shop.clone()
        }))
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn create(&self, product: NewProduct) -> AppResult<Product> {
        let mut state = self.state();
        if !state.shops.contains_key(&product.shop_id) {
            return Err(AppError::missing_reference());
        }
        if product.stock < 0 {
            return Err(AppError::validation("stock must not be negative"));
        }
        let now = Utc::now();
        let product = Product {
            id: state.next_id(),
            shop_id: product.shop_id,
            name: product.name,
            price: product.price,
            stock: product.stock,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: ProductId) -> AppResult<Option<Product>> {
        Ok(self.state().products.get(&id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Product>> {
        Ok(self.state().products.values().cloned().collect())
    }

    async fn list_by_shop(&self, shop_id: ShopId) -> AppResult<Vec<Product>> {
        Ok(self
            .state()
            .products
            .values()
            .filter(|p| p.shop_id == shop_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: ProductId, patch: &ProductPatch) -> AppResult<Option<Product>> {
        ensure_patch(patch)?;
        let mut state = self.state();
        Ok(state.products.get_mut(&id).map(|product| {
            patch.apply(product);
            product.clone()
        }))
    }

    async fn delete(&self, id: ProductId) -> AppResult<bool> {
        let mut state = self.state();
        let referenced = state
            .orders
            .values()
            .flat_map(|o| o.items.iter())
            .any(|i| i.product_id == id);
        if referenced {
            return Err(AppError::still_referenced());
        }
        Ok(state.products.remove(&id).is_some())
    }
}

#[async_trait]
impl CourierRepository for MemoryStore {
    async fn create(&self, courier: CreateCourierRequest) -> AppResult<Courier> {
        let mut state = self.state();
        let now = Utc::now();
        let courier = Courier {
            id: state.next_id(),
            brand: courier.brand,
            employer_name: courier.employer_name,
            phone: courier.phone,
            shipping_cost: courier.shipping_cost,
            created_at: now,
            updated_at: now,
        };
        state.couriers.insert(courier.id, courier.clone());
        Ok(courier)
    }

    async fn find_by_id(&self, id: CourierId) -> AppResult<Option<Courier>> {
        Ok(self.state().couriers.get(&id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Courier>> {
        Ok(self.state().couriers.values().cloned().collect())
    }

    async fn update(&self, id: CourierId, patch: &CourierPatch) -> AppResult<Option<Courier>> {
        ensure_patch(patch)?;
        let mut state = self.state();
        Ok(state.couriers.get_mut(&id).map(|courier| {
            patch.apply(courier);
            courier.clone()
        }))
    }

    async fn delete(&self, id: CourierId) -> AppResult<bool> {
        let mut state = self.state();
        if state.orders.values().any(|o| o.courier_id == id) {
            return Err(AppError::still_referenced());
        }
        Ok(state.couriers.remove(&id).is_some())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn place(&self, new_order: NewOrder) -> AppResult<Order> {
        let quantities = new_order.quantities_by_product()?;
        let mut state = self.state();

        if !state.users.contains_key(&new_order.user_id)
            || !state.shops.contains_key(&new_order.shop_id)
            || !state.couriers.contains_key(&new_order.courier_id)
        {
            return Err(AppError::missing_reference());
        }

        // Check every decrement before applying any of them.
        for (&product_id, &quantity) in &quantities {
            let covered = state.products.get(&product_id).is_some_and(|p| {
                p.shop_id == new_order.shop_id && p.stock >= quantity
            });
            if !covered {
                return Err(AppError::Validation(format!(
                    "insufficient stock for product {product_id}"
                )));
            }
        }

        let now = Utc::now();
        for (product_id, quantity) in &quantities {
            if let Some(product) = state.products.get_mut(product_id) {
                product.stock -= quantity;
                product.updated_at = now;
            }
        }

        let order_id = state.next_id();
        let mut items = Vec::with_capacity(new_order.items.len());
        for item in &new_order.items {
            items.push(OrderItem {
                id: state.next_id(),
                order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
            });
        }
        let order = Order {
            id: order_id,
            user_id: new_order.user_id,
            shop_id: new_order.shop_id,
            courier_id: new_order.courier_id,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            total: new_order.total,
            created_at: now,
            updated_at: now,
            items,
        };
        state.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> AppResult<Option<Order>> {
        Ok(self.state().orders.get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: UserId) -> AppResult<Vec<Order>> {
        Ok(self
            .state()
            .orders
            .values()
            .rev()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_by_shop(&self, shop_id: ShopId) -> AppResult<Vec<Order>> {
        Ok(self
            .state()
            .orders
            .values()
            .rev()
            .filter(|o| o.shop_id == shop_id)
            .cloned()
            .collect())
    }

    async fn update_status_if(
        &self,
        id: OrderId,
        expected: OrderStatus,
        new: OrderStatus,
    ) -> AppResult<bool> {
        let mut state = self.state();
        match state.orders.get_mut(&id) {
            Some(order) if order.status == expected => {
                order.status = new;
                order.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_payment_status_if(
        &self,
        id: OrderId,
        expected: PaymentStatus,
        new: PaymentStatus,
    ) -> AppResult<bool> {
        let mut state = self.state();
        match state.orders.get_mut(&id) {
            Some(order) if order.payment_status == expected => {
                order.payment_status = new;
                order.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Role;
    use crate::core_types::Address;
    use crate::order::NewOrderItem;
    use rust_decimal::Decimal;

    struct Seed {
        store: MemoryStore,
        buyer: UserId,
        shop: ShopId,
        courier: CourierId,
        p1: ProductId,
        p2: ProductId,
    }

    async fn seed() -> Seed {
        let store = MemoryStore::new();
        let new_user = |email: &str, role| NewUser {
            first_name: "M".into(),
            last_name: "S".into(),
            email: email.into(),
            phone: String::new(),
            address: Address::default(),
            password_hash: String::new(),
            role,
        };
        let buyer = UserRepository::create(&store, new_user("b@x.io", Role::General))
            .await
            .unwrap();
        let owner = UserRepository::create(&store, new_user("o@x.io", Role::Shop))
            .await
            .unwrap();
        let shop = ShopRepository::create(
            &store,
            NewShop {
                owner_id: owner.id,
                name: "S".into(),
                address: Address::default(),
            },
        )
        .await
        .unwrap();
        let courier = CourierRepository::create(
            &store,
            CreateCourierRequest {
                brand: "C".into(),
                employer_name: "C".into(),
                phone: String::new(),
                shipping_cost: Decimal::new(20, 0),
            },
        )
        .await
        .unwrap();
        let product = |stock| NewProduct {
            shop_id: shop.id,
            name: "P".into(),
            price: Decimal::new(100, 0),
            stock,
        };
        let p1 = ProductRepository::create(&store, product(5)).await.unwrap();
        let p2 = ProductRepository::create(&store, product(1)).await.unwrap();
        Seed {
            buyer: buyer.id,
            shop: shop.id,
            courier: courier.id,
            p1: p1.id,
            p2: p2.id,
            store,
        }
    }

    fn order(seed: &Seed, items: &[(ProductId, i32)]) -> NewOrder {
        NewOrder {
            user_id: seed.buyer,
            shop_id: seed.shop,
            courier_id: seed.courier,
            total: Decimal::ZERO,
            items: items
                .iter()
                .map(|&(product_id, quantity)| NewOrderItem {
                    product_id,
                    quantity,
                    price: Decimal::ZERO,
                })
                .collect(),
        }
    }

    async fn stock(store: &MemoryStore, id: ProductId) -> i32 {
        ProductRepository::find_by_id(store, id)
            .await
            .unwrap()
            .unwrap()
            .stock
    }

    #[tokio::test]
    async fn test_place_is_all_or_nothing() {
        let s = seed().await;
        // p1 is coverable, p2 is not
        let err = s
            .store
            .place(order(&s, &[(s.p1, 2), (s.p2, 2)]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(stock(&s.store, s.p1).await, 5);
        assert_eq!(stock(&s.store, s.p2).await, 1);
        assert!(s.store.list_by_user(s.buyer).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_place_sums_repeated_products() {
        let s = seed().await;
        assert!(s.store.place(order(&s, &[(s.p1, 3), (s.p1, 3)])).await.is_err());

        let placed = s
            .store
            .place(order(&s, &[(s.p1, 3), (s.p1, 2)]))
            .await
            .unwrap();
        assert_eq!(placed.items.len(), 2);
        assert_eq!(stock(&s.store, s.p1).await, 0);
    }

    #[tokio::test]
    async fn test_status_compare_and_set() {
        let s = seed().await;
        let placed = s.store.place(order(&s, &[(s.p1, 1)])).await.unwrap();

        assert!(
            s.store
                .update_status_if(placed.id, OrderStatus::Pending, OrderStatus::Shipped)
                .await
                .unwrap()
        );
        // stale expectation loses
        assert!(
            !s.store
                .update_status_if(placed.id, OrderStatus::Pending, OrderStatus::Cancelled)
                .await
                .unwrap()
        );
        assert!(
            !s.store
                .update_payment_status_if(999, PaymentStatus::Pending, PaymentStatus::Complete)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_referenced_rows_cannot_be_deleted() {
        let s = seed().await;
        s.store.place(order(&s, &[(s.p1, 1)])).await.unwrap();

        assert!(matches!(
            ProductRepository::delete(&s.store, s.p1).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            CourierRepository::delete(&s.store, s.courier).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            UserRepository::delete(&s.store, s.buyer).await,
            Err(AppError::Conflict(_))
        ));
        assert!(ProductRepository::delete(&s.store, s.p2).await.unwrap());
    }

    #[tokio::test]
    async fn test_dangling_references_rejected() {
        let s = seed().await;
        let mut dangling = order(&s, &[(s.p1, 1)]);
        dangling.courier_id = 9_999;
        let err = s.store.place(dangling).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.to_string(), AppError::missing_reference().to_string());
        assert_eq!(stock(&s.store, s.p1).await, 5);

        let err = ShopRepository::create(
            &s.store,
            NewShop {
                owner_id: 9_999,
                name: "Ghost".into(),
                address: Address::default(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), AppError::missing_reference().to_string());
    }

    #[tokio::test]
    async fn test_unique_email_and_owner() {
        let s = seed().await;
        let dup = UserRepository::create(
            &s.store,
            NewUser {
                first_name: "D".into(),
                last_name: "D".into(),
                email: "b@x.io".into(),
                phone: String::new(),
                address: Address::default(),
                password_hash: String::new(),
                role: Role::General,
            },
        )
        .await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));

        let owner = ShopRepository::find_by_id(&s.store, s.shop)
            .await
            .unwrap()
            .unwrap()
            .owner_id;
        let second = ShopRepository::create(
            &s.store,
            NewShop {
                owner_id: owner,
                name: "Again".into(),
                address: Address::default(),
            },
        )
        .await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }
}
