//! Core types used throughout the system
//!
//! Identifier aliases shared by every entity module. All ids are
//! PostgreSQL `BIGSERIAL` values, so they are signed 64-bit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// User ID - primary key of `users`, immutable after assignment.
pub type UserId = i64;

/// Shop ID - primary key of `shops`.
///
/// A shop has exactly one owner; see [`crate::shop::Shop::owner_id`].
pub type ShopId = i64;

/// Product ID - primary key of `products`.
pub type ProductId = i64;

/// Courier ID - primary key of `couriers`.
pub type CourierId = i64;

/// Order ID - primary key of `orders`.
pub type OrderId = i64;

/// Order item ID - primary key of `order_items`.
pub type OrderItemId = i64;

/// Quantity of a product (stock counter or ordered amount).
pub type Quantity = i32;

/// Postal address shared by users and shops.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
pub struct Address {
    #[serde(default)]
    #[validate(length(max = 100))]
    pub province: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub district: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub subdistrict: String,
    #[serde(default)]
    #[validate(length(max = 16))]
    #[schema(example = "10110")]
    pub zip_code: String,
    #[serde(default)]
    pub detail_address: String,
}

/// Money amounts are non-negative with at most two decimal places.
pub fn ensure_money(value: Decimal, field: &str) -> AppResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::Validation(format!("{field} must not be negative")));
    }
    if value.normalize().scale() > MONEY_SCALE {
        return Err(AppError::Validation(format!(
            "{field} must have at most {MONEY_SCALE} decimal places"
        )));
    }
    Ok(())
}

/// Decimal places stored for money columns (`NUMERIC(14,2)`).
pub const MONEY_SCALE: u32 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_money() {
        assert!(ensure_money(Decimal::new(10050, 2), "price").is_ok());
        assert!(ensure_money(Decimal::new(100500, 3), "price").is_ok()); // 100.500
        assert!(ensure_money(Decimal::ZERO, "price").is_ok());
        assert!(ensure_money(Decimal::new(-1, 0), "price").is_err());
        assert!(ensure_money(Decimal::new(1001, 3), "price").is_err());
    }
}
