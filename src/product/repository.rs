use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::models::{NewProduct, Product, ProductPatch};
use crate::core_types::{ProductId, ShopId};
use crate::db::patch::update_query;
use crate::error::AppResult;

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: NewProduct) -> AppResult<Product>;
    async fn find_by_id(&self, id: ProductId) -> AppResult<Option<Product>>;
    async fn list(&self) -> AppResult<Vec<Product>>;
    async fn list_by_shop(&self, shop_id: ShopId) -> AppResult<Vec<Product>>;
    async fn update(&self, id: ProductId, patch: &ProductPatch) -> AppResult<Option<Product>>;
    /// Conflict when order items still reference the product.
    async fn delete(&self, id: ProductId) -> AppResult<bool>;
}

pub(crate) const PRODUCT_COLUMNS: &str =
    "id, shop_id, name, price, stock, created_at, updated_at";

pub(crate) fn product_from_row(r: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: r.try_get("id")?,
        shop_id: r.try_get("shop_id")?,
        name: r.try_get("name")?,
        price: r.try_get("price")?,
        stock: r.try_get("stock")?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, product: NewProduct) -> AppResult<Product> {
        let sql = format!(
            "INSERT INTO products (shop_id, name, price, stock) VALUES ($1, $2, $3, $4) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(product.shop_id)
            .bind(&product.name)
            .bind(product.price)
            .bind(product.stock)
            .fetch_one(&self.pool)
            .await?;
        Ok(product_from_row(&row)?)
    }

    async fn find_by_id(&self, id: ProductId) -> AppResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(product_from_row).transpose()?)
    }

    async fn list(&self) -> AppResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn list_by_shop(&self, shop_id: ShopId) -> AppResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE shop_id = $1 ORDER BY id");
        let rows = sqlx::query(&sql)
            .bind(shop_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn update(&self, id: ProductId, patch: &ProductPatch) -> AppResult<Option<Product>> {
        let mut qb = update_query("products", id, patch, PRODUCT_COLUMNS)?;
        let row = qb.build().fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(product_from_row).transpose()?)
    }

    async fn delete(&self, id: ProductId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
