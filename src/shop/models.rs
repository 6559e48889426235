use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::core_types::{Address, ShopId, UserId};
use crate::db::patch::{Patch, PatchValue, push_text};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Shop {
    #[schema(example = 1)]
    pub id: ShopId,
    /// Unique: a user owns at most one shop
    pub owner_id: UserId,
    #[schema(example = "Baan Coffee")]
    pub name: String,
    pub address: Address,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewShop {
    pub owner_id: UserId,
    pub name: String,
    pub address: Address,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateShopRequest {
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "Baan Coffee")]
    pub name: String,
    #[serde(default)]
    #[validate(nested)]
    pub address: Address,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct ShopPatch {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub province: Option<String>,
    #[validate(length(max = 100))]
    pub district: Option<String>,
    #[validate(length(max = 100))]
    pub subdistrict: Option<String>,
    #[validate(length(max = 16))]
    pub zip_code: Option<String>,
    pub detail_address: Option<String>,
}

impl Patch for ShopPatch {
    fn fields(&self) -> Vec<(&'static str, PatchValue)> {
        let mut fields = Vec::new();
        push_text(&mut fields, "name", &self.name);
        push_text(&mut fields, "province", &self.province);
        push_text(&mut fields, "district", &self.district);
        push_text(&mut fields, "subdistrict", &self.subdistrict);
        push_text(&mut fields, "zip_code", &self.zip_code);
        push_text(&mut fields, "detail_address", &self.detail_address);
        fields
    }
}

impl ShopPatch {
    pub fn apply(&self, shop: &mut Shop) {
        if let Some(v) = &self.name {
            shop.name.clone_from(v);
        }
        let address = &mut shop.address;
        for (target, value) in [
            (&mut address.province, &self.province),
            (&mut address.district, &self.district),
            (&mut address.subdistrict, &self.subdistrict),
            (&mut address.zip_code, &self.zip_code),
            (&mut address.detail_address, &self.detail_address),
        ] {
            if let Some(v) = value {
                target.clone_from(v);
            }
        }
        shop.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_apply_touches_only_set_fields() {
        let now = Utc::now();
        let mut shop = Shop {
            id: 1,
            owner_id: 2,
            name: "Old".into(),
            address: Address {
                province: "Bangkok".into(),
                ..Default::default()
            },
            created_at: now,
            updated_at: now,
        };
        let patch = ShopPatch {
            name: Some("New".into()),
            zip_code: Some("10200".into()),
            ..Default::default()
        };
        patch.apply(&mut shop);
        assert_eq!(shop.name, "New");
        assert_eq!(shop.address.province, "Bangkok");
        assert_eq!(shop.address.zip_code, "10200");
        assert_eq!(
            patch.fields().into_iter().map(|(c, _)| c).collect::<Vec<_>>(),
            vec!["name", "zip_code"]
        );
    }
}
