use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::state::{OrderStatus, PaymentStatus};
use crate::core_types::{CourierId, OrderId, OrderItemId, ProductId, Quantity, ShopId, UserId};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Order {
    #[schema(example = 1)]
    pub id: OrderId,
    /// Buyer
    pub user_id: UserId,
    pub shop_id: ShopId,
    pub courier_id: CourierId,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Sum of line prices plus the courier's shipping cost, fixed at creation
    #[schema(value_type = String, example = "220.00")]
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    #[schema(example = 2)]
    pub quantity: Quantity,
    /// Line price: unit price x quantity at the time of ordering
    #[schema(value_type = String, example = "200.00")]
    pub price: Decimal,
}

/// Priced order ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub shop_id: ShopId,
    pub courier_id: CourierId,
    pub total: Decimal,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: Quantity,
    /// Line price
    pub price: Decimal,
}

impl NewOrder {
    /// Total requested quantity per product, ascending by product id.
    pub fn quantities_by_product(&self) -> AppResult<BTreeMap<ProductId, Quantity>> {
        sum_quantities(self.items.iter().map(|i| (i.product_id, i.quantity)))
    }
}

pub(crate) fn sum_quantities(
    items: impl IntoIterator<Item = (ProductId, Quantity)>,
) -> AppResult<BTreeMap<ProductId, Quantity>> {
    let mut totals = BTreeMap::new();
    for (product_id, quantity) in items {
        let entry = totals.entry(product_id).or_insert(0 as Quantity);
        *entry = entry
            .checked_add(quantity)
            .ok_or_else(|| AppError::validation("quantity out of range"))?;
    }
    Ok(totals)
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct OrderItemRequest {
    #[schema(example = 1)]
    pub product_id: ProductId,
    #[validate(range(min = 1))]
    #[schema(example = 2)]
    pub quantity: Quantity,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateOrderRequest {
    #[schema(example = 1)]
    pub shop_id: ShopId,
    #[schema(example = 1)]
    pub courier_id: CourierId,
    #[validate(length(min = 1), nested)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct UpdateStatusRequest {
    /// `pending`, `shipped`, `delivered` or `cancelled`
    #[schema(example = "shipped")]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct UpdatePaymentRequest {
    /// `pending` or `complete`
    #[schema(example = "complete")]
    pub payment_status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_quantities_merges_repeats() {
        let totals = sum_quantities([(3, 1), (1, 2), (3, 4)]).unwrap();
        assert_eq!(totals.into_iter().collect::<Vec<_>>(), vec![(1, 2), (3, 5)]);
    }

    #[test]
    fn test_sum_quantities_overflow() {
        assert!(matches!(
            sum_quantities([(1, Quantity::MAX), (1, 1)]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_create_request_validation() {
        let empty: CreateOrderRequest =
            serde_json::from_str(r#"{"shop_id":1,"courier_id":1,"items":[]}"#).unwrap();
        assert!(empty.validate().is_err());

        let zero_qty: CreateOrderRequest = serde_json::from_str(
            r#"{"shop_id":1,"courier_id":1,"items":[{"product_id":1,"quantity":0}]}"#,
        )
        .unwrap();
        assert!(zero_qty.validate().is_err());

        let fine: CreateOrderRequest = serde_json::from_str(
            r#"{"shop_id":1,"courier_id":1,"items":[{"product_id":1,"quantity":2}]}"#,
        )
        .unwrap();
        assert!(fine.validate().is_ok());
    }
}
