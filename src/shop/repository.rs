use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::models::{NewShop, Shop, ShopPatch};
use crate::core_types::{Address, ShopId, UserId};
use crate::db::patch::update_query;
use crate::error::AppResult;

#[async_trait]
pub trait ShopRepository: Send + Sync {
    /// Conflict when the owner already has a shop.
    async fn create(&self, shop: NewShop) -> AppResult<Shop>;
    async fn find_by_id(&self, id: ShopId) -> AppResult<Option<Shop>>;
    async fn find_by_owner(&self, owner_id: UserId) -> AppResult<Option<Shop>>;
    async fn list(&self) -> AppResult<Vec<Shop>>;
    async fn update(&self, id: ShopId, patch: &ShopPatch) -> AppResult<Option<Shop>>;
}

const SHOP_COLUMNS: &str = "id, owner_id, name, province, district, subdistrict, zip_code, \
     detail_address, created_at, updated_at";

fn shop_from_row(r: &PgRow) -> Result<Shop, sqlx::Error> {
    Ok(Shop {
        id: r.try_get("id")?,
        owner_id: r.try_get("owner_id")?,
        name: r.try_get("name")?,
        address: Address {
            province: r.try_get("province")?,
            district: r.try_get("district")?,
            subdistrict: r.try_get("subdistrict")?,
            zip_code: r.try_get("zip_code")?,
            detail_address: r.try_get("detail_address")?,
        },
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

pub struct PgShopRepository {
    pool: PgPool,
}

impl PgShopRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShopRepository for PgShopRepository {
    async fn create(&self, shop: NewShop) -> AppResult<Shop> {
        let sql = format!(
            r#"INSERT INTO shops (owner_id, name, province, district, subdistrict, zip_code, detail_address)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {SHOP_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(shop.owner_id)
            .bind(&shop.name)
            .bind(&shop.address.province)
            .bind(&shop.address.district)
            .bind(&shop.address.subdistrict)
            .bind(&shop.address.zip_code)
            .bind(&shop.address.detail_address)
            .fetch_one(&self.pool)
            .await?;
        Ok(shop_from_row(&row)?)
    }

    async fn find_by_id(&self, id: ShopId) -> AppResult<Option<Shop>> {
        let sql = format!("SELECT {SHOP_COLUMNS} FROM shops WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(shop_from_row).transpose()?)
    }

    async fn find_by_owner(&self, owner_id: UserId) -> AppResult<Option<Shop>> {
        let sql = format!("SELECT {SHOP_COLUMNS} FROM shops WHERE owner_id = $1");
        let row = sqlx::query(&sql)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(shop_from_row).transpose()?)
    }

    async fn list(&self) -> AppResult<Vec<Shop>> {
        let sql = format!("SELECT {SHOP_COLUMNS} FROM shops ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(shop_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn update(&self, id: ShopId, patch: &ShopPatch) -> AppResult<Option<Shop>> {
        let mut qb = update_query("shops", id, patch, SHOP_COLUMNS)?;
        let row = qb.build().fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(shop_from_row).transpose()?)
    }
}
