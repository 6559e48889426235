use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::core_types::CourierId;
use crate::db::patch::{Patch, PatchValue, push_text};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Courier {
    #[schema(example = 1)]
    pub id: CourierId,
    #[schema(example = "Kerry")]
    pub brand: String,
    pub employer_name: String,
    pub phone: String,
    /// Flat fee added to every order total
    #[schema(value_type = String, example = "20.00")]
    pub shipping_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Also the insert payload.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateCourierRequest {
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Kerry")]
    pub brand: String,
    #[validate(length(min = 1, max = 255))]
    pub employer_name: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub phone: String,
    #[schema(value_type = String, example = "20.00")]
    pub shipping_cost: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct CourierPatch {
    #[validate(length(min = 1, max = 100))]
    pub brand: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub employer_name: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[schema(value_type = Option<String>)]
    pub shipping_cost: Option<Decimal>,
}

impl Patch for CourierPatch {
    fn fields(&self) -> Vec<(&'static str, PatchValue)> {
        let mut fields = Vec::new();
        push_text(&mut fields, "brand", &self.brand);
        push_text(&mut fields, "employer_name", &self.employer_name);
        push_text(&mut fields, "phone", &self.phone);
        if let Some(cost) = self.shipping_cost {
            fields.push(("shipping_cost", PatchValue::Money(cost)));
        }
        fields
    }
}

impl CourierPatch {
    pub fn apply(&self, courier: &mut Courier) {
        for (target, value) in [
            (&mut courier.brand, &self.brand),
            (&mut courier.employer_name, &self.employer_name),
            (&mut courier.phone, &self.phone),
        ] {
            if let Some(v) = value {
                target.clone_from(v);
            }
        }
        if let Some(cost) = self.shipping_cost {
            courier.shipping_cost = cost;
        }
        courier.updated_at = Utc::now();
    }
}
