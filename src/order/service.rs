//! Order workflow: placement, status transitions and visibility.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use super::models::{CreateOrderRequest, NewOrder, NewOrderItem, Order, sum_quantities};
use super::repository::OrderRepository;
use super::state::{OrderStatus, PaymentStatus};
use crate::account::{Role, UserRepository};
use crate::auth::AuthenticatedUser;
use crate::core_types::OrderId;
use crate::courier::CourierRepository;
use crate::error::{AppError, AppResult};
use crate::events::{DomainEvent, EventPublisher};
use crate::product::ProductRepository;
use crate::shop::ShopRepository;

pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    shops: Arc<dyn ShopRepository>,
    products: Arc<dyn ProductRepository>,
    couriers: Arc<dyn CourierRepository>,
    users: Arc<dyn UserRepository>,
    events: EventPublisher,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        shops: Arc<dyn ShopRepository>,
        products: Arc<dyn ProductRepository>,
        couriers: Arc<dyn CourierRepository>,
        users: Arc<dyn UserRepository>,
        events: EventPublisher,
    ) -> Self {
        Self {
            orders,
            shops,
            products,
            couriers,
            users,
            events,
        }
    }

    /// Validate, price and place an order for `caller`.
    ///
    /// All reads and checks happen before the single write call to
    /// [`OrderRepository::place`], which is atomic.
    pub async fn create_order(
        &self,
        caller: &AuthenticatedUser,
        req: CreateOrderRequest,
    ) -> AppResult<Order> {
        if req.items.is_empty() {
            return Err(AppError::validation("order must contain at least one item"));
        }
        if let Some(item) = req.items.iter().find(|i| i.quantity < 1) {
            return Err(AppError::Validation(format!(
                "quantity for product {} must be at least 1",
                item.product_id
            )));
        }

        let shop = self
            .shops
            .find_by_id(req.shop_id)
            .await?
            .ok_or_else(|| AppError::not_found("shop"))?;
        let courier = self
            .couriers
            .find_by_id(req.courier_id)
            .await?
            .ok_or_else(|| AppError::not_found("courier"))?;
        let buyer = self
            .users
            .find_by_id(caller.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user"))?;
        if buyer.role != Role::General {
            return Err(AppError::forbidden("only general users can place orders"));
        }

        let requested = sum_quantities(req.items.iter().map(|i| (i.product_id, i.quantity)))?;

        let mut total = Decimal::ZERO;
        let mut items = Vec::with_capacity(req.items.len());
        for item in &req.items {
            let product = self
                .products
                .find_by_id(item.product_id)
                .await?
                .ok_or_else(|| AppError::not_found("product"))?;
            if product.shop_id != shop.id {
                return Err(AppError::Validation(format!(
                    "product {} does not belong to shop {}",
                    product.id, shop.id
                )));
            }
            let wanted = requested.get(&product.id).copied().unwrap_or(item.quantity);
            if product.stock < wanted {
                return Err(AppError::Validation(format!(
                    "insufficient stock for product {}",
                    product.id
                )));
            }

            let line = product
                .price
                .checked_mul(Decimal::from(item.quantity))
                .ok_or_else(|| AppError::validation("order total out of range"))?;
            total = total
                .checked_add(line)
                .ok_or_else(|| AppError::validation("order total out of range"))?;
            items.push(NewOrderItem {
                product_id: product.id,
                quantity: item.quantity,
                price: line,
            });
        }
        total = total
            .checked_add(courier.shipping_cost)
            .ok_or_else(|| AppError::validation("order total out of range"))?;

        let order = self
            .orders
            .place(NewOrder {
                user_id: buyer.id,
                shop_id: shop.id,
                courier_id: courier.id,
                total,
                items,
            })
            .await?;

        info!(
            order_id = order.id,
            user_id = order.user_id,
            shop_id = order.shop_id,
            total = %order.total,
            "order placed"
        );
        self.events.publish(DomainEvent::OrderPlaced {
            order_id: order.id,
            user_id: order.user_id,
            shop_id: order.shop_id,
        });
        Ok(order)
    }

    /// Buyer (general) or owner of the order's shop (shop); nobody else.
    pub async fn get_order(&self, caller: &AuthenticatedUser, id: OrderId) -> AppResult<Order> {
        let order = self.find(id).await?;
        if !self.can_view(caller, &order).await? {
            return Err(AppError::forbidden("not allowed to view this order"));
        }
        Ok(order)
    }

    pub async fn can_view(&self, caller: &AuthenticatedUser, order: &Order) -> AppResult<bool> {
        match caller.role {
            Role::General => Ok(order.user_id == caller.user_id),
            Role::Shop => Ok(self
                .shops
                .find_by_id(order.shop_id)
                .await?
                .is_some_and(|shop| shop.owner_id == caller.user_id)),
            Role::Admin => Ok(false),
        }
    }

    /// Caller's own orders, newest first.
    pub async fn list_orders(&self, caller: &AuthenticatedUser) -> AppResult<Vec<Order>> {
        caller.require_role(Role::General)?;
        self.orders.list_by_user(caller.user_id).await
    }

    /// Orders of the caller's shop, newest first.
    pub async fn list_shop_orders(&self, caller: &AuthenticatedUser) -> AppResult<Vec<Order>> {
        caller.require_role(Role::Shop)?;
        let shop = self
            .shops
            .find_by_owner(caller.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("shop"))?;
        self.orders.list_by_shop(shop.id).await
    }

    /// Shop owner changes fulfillment status.
    pub async fn update_status(
        &self,
        caller: &AuthenticatedUser,
        id: OrderId,
        status: &str,
    ) -> AppResult<Order> {
        self.transition_status(caller, id, status).await
    }

    /// Shop owner cancels the order. Stock is not restored.
    pub async fn cancel_order(&self, caller: &AuthenticatedUser, id: OrderId) -> AppResult<Order> {
        self.transition_status(caller, id, OrderStatus::Cancelled.as_str())
            .await
    }

    /// Checks run NotFound, then Forbidden, then the status itself.
    async fn transition_status(
        &self,
        caller: &AuthenticatedUser,
        id: OrderId,
        status: &str,
    ) -> AppResult<Order> {
        let order = self.find(id).await?;
        let shop = self
            .shops
            .find_by_id(order.shop_id)
            .await?
            .ok_or_else(|| AppError::not_found("shop"))?;
        if shop.owner_id != caller.user_id {
            return Err(AppError::forbidden("only the shop owner can change order status"));
        }
        let next: OrderStatus = status.parse()?;

        let current = order.status;
        if current == next {
            return Ok(order);
        }
        if !current.can_transition_to(next) {
            return Err(AppError::Validation(format!(
                "cannot change order status from {current} to {next}"
            )));
        }
        if !self.orders.update_status_if(id, current, next).await? {
            warn!(order_id = id, from = %current, to = %next, "order status changed concurrently");
            return Err(AppError::Conflict(
                "order status changed concurrently".to_string(),
            ));
        }

        info!(order_id = id, shop_id = shop.id, from = %current, to = %next, "order status changed");
        self.events.publish(DomainEvent::OrderStatusChanged {
            order_id: id,
            from: current,
            to: next,
        });
        self.find(id).await
    }

    /// Buyer changes payment status.
    pub async fn update_payment_status(
        &self,
        caller: &AuthenticatedUser,
        id: OrderId,
        status: &str,
    ) -> AppResult<Order> {
        let order = self.find(id).await?;
        if order.user_id != caller.user_id {
            return Err(AppError::forbidden("only the buyer can change payment status"));
        }
        let next: PaymentStatus = status.parse()?;

        let current = order.payment_status;
        if current == next {
            return Ok(order);
        }
        if !current.can_transition_to(next) {
            return Err(AppError::Validation(format!(
                "cannot change payment status from {current} to {next}"
            )));
        }
        if !self
            .orders
            .update_payment_status_if(id, current, next)
            .await?
        {
            warn!(order_id = id, from = %current, to = %next, "payment status changed concurrently");
            return Err(AppError::Conflict(
                "payment status changed concurrently".to_string(),
            ));
        }

        info!(order_id = id, user_id = caller.user_id, from = %current, to = %next, "payment status changed");
        self.events.publish(DomainEvent::PaymentStatusChanged {
            order_id: id,
            from: current,
            to: next,
        });
        self.find(id).await
    }

    async fn find(&self, id: OrderId) -> AppResult<Order> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("order"))
    }
}
