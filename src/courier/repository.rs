use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::models::{Courier, CourierPatch, CreateCourierRequest};
use crate::core_types::CourierId;
use crate::db::patch::update_query;
use crate::error::AppResult;

#[async_trait]
pub trait CourierRepository: Send + Sync {
    async fn create(&self, courier: CreateCourierRequest) -> AppResult<Courier>;
    async fn find_by_id(&self, id: CourierId) -> AppResult<Option<Courier>>;
    async fn list(&self) -> AppResult<Vec<Courier>>;
    async fn update(&self, id: CourierId, patch: &CourierPatch) -> AppResult<Option<Courier>>;
    /// Conflict when orders still reference the courier.
    async fn delete(&self, id: CourierId) -> AppResult<bool>;
}

const COURIER_COLUMNS: &str =
    "id, brand, employer_name, phone, shipping_cost, created_at, updated_at";

fn courier_from_row(r: &PgRow) -> Result<Courier, sqlx::Error> {
    Ok(Courier {
        id: r.try_get("id")?,
        brand: r.try_get("brand")?,
        employer_name: r.try_get("employer_name")?,
        phone: r.try_get("phone")?,
        shipping_cost: r.try_get("shipping_cost")?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

pub struct PgCourierRepository {
    pool: PgPool,
}

impl PgCourierRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourierRepository for PgCourierRepository {
    async fn create(&self, courier: CreateCourierRequest) -> AppResult<Courier> {
        let sql = format!(
            "INSERT INTO couriers (brand, employer_name, phone, shipping_cost) \
             VALUES ($1, $2, $3, $4) RETURNING {COURIER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&courier.brand)
            .bind(&courier.employer_name)
            .bind(&courier.phone)
            .bind(courier.shipping_cost)
            .fetch_one(&self.pool)
            .await?;
        Ok(courier_from_row(&row)?)
    }

    async fn find_by_id(&self, id: CourierId) -> AppResult<Option<Courier>> {
        let sql = format!("SELECT {COURIER_COLUMNS} FROM couriers WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(courier_from_row).transpose()?)
    }

    async fn list(&self) -> AppResult<Vec<Courier>> {
        let sql = format!("SELECT {COURIER_COLUMNS} FROM couriers ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(courier_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn update(&self, id: CourierId, patch: &CourierPatch) -> AppResult<Option<Courier>> {
        let mut qb = update_query("couriers", id, patch, COURIER_COLUMNS)?;
        let row = qb.build().fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(courier_from_row).transpose()?)
    }

    async fn delete(&self, id: CourierId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM couriers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
