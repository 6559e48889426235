use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::core_types::{ProductId, Quantity, ShopId};
use crate::db::patch::{Patch, PatchValue, push_text};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Product {
    #[schema(example = 1)]
    pub id: ProductId,
    pub shop_id: ShopId,
    #[schema(example = "Drip coffee 250g")]
    pub name: String,
    /// Unit price
    #[schema(value_type = String, example = "100.00")]
    pub price: Decimal,
    /// Never negative
    #[schema(example = 5)]
    pub stock: Quantity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub shop_id: ShopId,
    pub name: String,
    pub price: Decimal,
    pub stock: Quantity,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "Drip coffee 250g")]
    pub name: String,
    #[schema(value_type = String, example = "100.00")]
    pub price: Decimal,
    #[validate(range(min = 0))]
    #[schema(example = 5)]
    pub stock: Quantity,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct ProductPatch {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock: Option<Quantity>,
}

impl Patch for ProductPatch {
    fn fields(&self) -> Vec<(&'static str, PatchValue)> {
        let mut fields = Vec::new();
        push_text(&mut fields, "name", &self.name);
        if let Some(price) = self.price {
            fields.push(("price", PatchValue::Money(price)));
        }
        if let Some(stock) = self.stock {
            fields.push(("stock", PatchValue::Int(stock)));
        }
        fields
    }
}

impl ProductPatch {
    pub fn apply(&self, product: &mut Product) {
        if let Some(v) = &self.name {
            product.name.clone_from(v);
        }
        if let Some(v) = self.price {
            product.price = v;
        }
        if let Some(v) = self.stock {
            product.stock = v;
        }
        product.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_accepts_string_and_number() {
        let a: CreateProductRequest =
            serde_json::from_str(r#"{"name":"x","price":"12.50","stock":1}"#).unwrap();
        let b: CreateProductRequest =
            serde_json::from_str(r#"{"name":"x","price":12.5,"stock":1}"#).unwrap();
        assert_eq!(a.price, b.price);
    }

    #[test]
    fn test_negative_stock_rejected() {
        let req: CreateProductRequest =
            serde_json::from_str(r#"{"name":"x","price":"1.00","stock":-1}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_patch_fields() {
        let patch = ProductPatch {
            price: Some(Decimal::new(999, 2)),
            stock: Some(0),
            ..Default::default()
        };
        assert_eq!(
            patch.fields(),
            vec![
                ("price", PatchValue::Money(Decimal::new(999, 2))),
                ("stock", PatchValue::Int(0)),
            ]
        );
    }
}
