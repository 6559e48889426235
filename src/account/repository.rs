//! Repository layer for user accounts

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::models::{NewUser, User, UserPatch};
use crate::core_types::{Address, UserId};
use crate::db::patch::update_query;
use crate::error::AppResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> AppResult<User>;
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn list(&self) -> AppResult<Vec<User>>;
    /// `Ok(None)` when the user does not exist.
    async fn update(&self, id: UserId, patch: &UserPatch) -> AppResult<Option<User>>;
    /// `Ok(false)` when the user does not exist.
    async fn delete(&self, id: UserId) -> AppResult<bool>;
}

const USER_COLUMNS: &str = "id, first_name, last_name, email, phone, province, district, \
     subdistrict, zip_code, detail_address, password_hash, role, created_at, updated_at";

pub(crate) fn user_from_row(r: &PgRow) -> Result<User, sqlx::Error> {
    let role: String = r.try_get("role")?;
    Ok(User {
        id: r.try_get("id")?,
        first_name: r.try_get("first_name")?,
        last_name: r.try_get("last_name")?,
        email: r.try_get("email")?,
        phone: r.try_get("phone")?,
        address: Address {
            province: r.try_get("province")?,
            district: r.try_get("district")?,
            subdistrict: r.try_get("subdistrict")?,
            zip_code: r.try_get("zip_code")?,
            detail_address: r.try_get("detail_address")?,
        },
        password_hash: r.try_get("password_hash")?,
        role: role.parse().map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

/// PostgreSQL-backed [`UserRepository`]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let sql = format!(
            r#"INSERT INTO users (first_name, last_name, email, phone, province, district,
                                  subdistrict, zip_code, detail_address, password_hash, role)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               RETURNING {USER_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.address.province)
            .bind(&user.address.district)
            .bind(&user.address.subdistrict)
            .bind(&user.address.zip_code)
            .bind(&user.address.detail_address)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(user_from_row(&row)?)
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn update(&self, id: UserId, patch: &UserPatch) -> AppResult<Option<User>> {
        let mut qb = update_query("users", id, patch, USER_COLUMNS)?;
        let row = qb.build().fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
