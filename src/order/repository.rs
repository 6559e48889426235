//! Order persistence
//!
//! [`OrderRepository::place`] is the only write path that touches more than
//! one table: it inserts the order and its items and decrements stock inside
//! one transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::warn;

use super::models::{NewOrder, Order, OrderItem};
use super::state::{OrderStatus, PaymentStatus};
use crate::core_types::{OrderId, ShopId, UserId};
use crate::error::{AppError, AppResult};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist order, items and stock decrements all-or-nothing.
    ///
    /// Fails with a validation error ("insufficient stock") when any
    /// product cannot cover its quantity; nothing is written then.
    async fn place(&self, order: NewOrder) -> AppResult<Order>;
    /// Order with its items.
    async fn find_by_id(&self, id: OrderId) -> AppResult<Option<Order>>;
    /// Newest first.
    async fn list_by_user(&self, user_id: UserId) -> AppResult<Vec<Order>>;
    /// Newest first.
    async fn list_by_shop(&self, shop_id: ShopId) -> AppResult<Vec<Order>>;
    /// Compare-and-set; `false` when the stored status is no longer `expected`.
    async fn update_status_if(
        &self,
        id: OrderId,
        expected: OrderStatus,
        new: OrderStatus,
    ) -> AppResult<bool>;
    async fn update_payment_status_if(
        &self,
        id: OrderId,
        expected: PaymentStatus,
        new: PaymentStatus,
    ) -> AppResult<bool>;
}

const ORDER_COLUMNS: &str =
    "id, user_id, shop_id, courier_id, status, payment_status, total, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, order_id, product_id, quantity, price";

fn order_from_row(r: &PgRow) -> Result<Order, sqlx::Error> {
    let status: String = r.try_get("status")?;
    let payment_status: String = r.try_get("payment_status")?;
    Ok(Order {
        id: r.try_get("id")?,
        user_id: r.try_get("user_id")?,
        shop_id: r.try_get("shop_id")?,
        courier_id: r.try_get("courier_id")?,
        status: status
            .parse()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        payment_status: payment_status
            .parse()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        total: r.try_get("total")?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
        items: Vec::new(),
    })
}

fn item_from_row(r: &PgRow) -> Result<OrderItem, sqlx::Error> {
    Ok(OrderItem {
        id: r.try_get("id")?,
        order_id: r.try_get("order_id")?,
        product_id: r.try_get("product_id")?,
        quantity: r.try_get("quantity")?,
        price: r.try_get("price")?,
    })
}

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach items to already loaded orders with one query.
    async fn attach_items(&self, mut orders: Vec<Order>) -> AppResult<Vec<Order>> {
        if orders.is_empty() {
            return Ok(orders);
        }
        let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
        let sql = format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY id");
        let rows = sqlx::query(&sql)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in &rows {
            let item = item_from_row(row)?;
            by_order.entry(item.order_id).or_default().push(item);
        }
        for order in &mut orders {
            order.items = by_order.remove(&order.id).unwrap_or_default();
        }
        Ok(orders)
    }

    async fn list_where(&self, column: &str, value: i64) -> AppResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE {column} = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        let orders = rows
            .iter()
            .map(order_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        self.attach_items(orders).await
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn place(&self, new_order: NewOrder) -> AppResult<Order> {
        let quantities = new_order.quantities_by_product()?;
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO orders (user_id, shop_id, courier_id, status, payment_status, total) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(new_order.user_id)
            .bind(new_order.shop_id)
            .bind(new_order.courier_id)
            .bind(OrderStatus::Pending.as_str())
            .bind(PaymentStatus::Pending.as_str())
            .bind(new_order.total)
            .fetch_one(&mut *tx)
            .await?;
        let mut order = order_from_row(&row)?;

        let item_sql = format!(
            "INSERT INTO order_items (order_id, product_id, quantity, price) \
             VALUES ($1, $2, $3, $4) RETURNING {ITEM_COLUMNS}"
        );
        for item in &new_order.items {
            let row = sqlx::query(&item_sql)
                .bind(order.id)
                .bind(item.product_id)
                .bind(item.quantity)
                .bind(item.price)
                .fetch_one(&mut *tx)
                .await?;
            order.items.push(item_from_row(&row)?);
        }

        // Ascending product id order.
        for (product_id, quantity) in quantities {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock = stock - $1, updated_at = NOW()
                WHERE id = $2 AND shop_id = $3 AND stock >= $1
                "#,
            )
            .bind(quantity)
            .bind(product_id)
            .bind(new_order.shop_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                warn!(product_id, shop_id = new_order.shop_id, "stock decrement lost, rolling back order");
                tx.rollback().await?;
                return Err(AppError::Validation(format!(
                    "insufficient stock for product {product_id}"
                )));
            }
        }

        tx.commit().await?;
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> AppResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let order = order_from_row(&row)?;
        Ok(self.attach_items(vec![order]).await?.pop())
    }

    async fn list_by_user(&self, user_id: UserId) -> AppResult<Vec<Order>> {
        self.list_where("user_id", user_id).await
    }

    async fn list_by_shop(&self, shop_id: ShopId) -> AppResult<Vec<Order>> {
        self.list_where("shop_id", shop_id).await
    }

    async fn update_status_if(
        &self,
        id: OrderId,
        expected: OrderStatus,
        new: OrderStatus,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = $3
            "#,
        )
        .bind(new.as_str())
        .bind(id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_payment_status_if(
        &self,
        id: OrderId,
        expected: PaymentStatus,
        new: PaymentStatus,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET payment_status = $1, updated_at = NOW()
            WHERE id = $2 AND payment_status = $3
            "#,
        )
        .bind(new.as_str())
        .bind(id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
