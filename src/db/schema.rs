//! PostgreSQL schema. Every statement is idempotent.

use sqlx::PgPool;

pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id              BIGSERIAL PRIMARY KEY,
    first_name      VARCHAR(100) NOT NULL,
    last_name       VARCHAR(100) NOT NULL,
    email           VARCHAR(255) NOT NULL,
    phone           VARCHAR(32)  NOT NULL DEFAULT '',
    province        VARCHAR(100) NOT NULL DEFAULT '',
    district        VARCHAR(100) NOT NULL DEFAULT '',
    subdistrict     VARCHAR(100) NOT NULL DEFAULT '',
    zip_code        VARCHAR(16)  NOT NULL DEFAULT '',
    detail_address  TEXT         NOT NULL DEFAULT '',
    password_hash   TEXT         NOT NULL,
    role            VARCHAR(16)  NOT NULL CHECK (role IN ('general', 'shop', 'admin')),
    created_at      TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
    CONSTRAINT users_email_key UNIQUE (email)
)
"#;

pub const CREATE_SHOPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS shops (
    id              BIGSERIAL PRIMARY KEY,
    owner_id        BIGINT       NOT NULL REFERENCES users (id),
    name            VARCHAR(255) NOT NULL,
    province        VARCHAR(100) NOT NULL DEFAULT '',
    district        VARCHAR(100) NOT NULL DEFAULT '',
    subdistrict     VARCHAR(100) NOT NULL DEFAULT '',
    zip_code        VARCHAR(16)  NOT NULL DEFAULT '',
    detail_address  TEXT         NOT NULL DEFAULT '',
    created_at      TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
    CONSTRAINT shops_owner_id_key UNIQUE (owner_id)
)
"#;

pub const CREATE_PRODUCTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id              BIGSERIAL PRIMARY KEY,
    shop_id         BIGINT        NOT NULL REFERENCES shops (id),
    name            VARCHAR(255)  NOT NULL,
    price           NUMERIC(14,2) NOT NULL CHECK (price >= 0),
    stock           INTEGER       NOT NULL CHECK (stock >= 0),
    created_at      TIMESTAMPTZ   NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ   NOT NULL DEFAULT NOW()
)
"#;

pub const CREATE_PRODUCTS_SHOP_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_products_shop_id ON products (shop_id)";

pub const CREATE_COURIERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS couriers (
    id              BIGSERIAL PRIMARY KEY,
    brand           VARCHAR(100)  NOT NULL,
    employer_name   VARCHAR(255)  NOT NULL,
    phone           VARCHAR(32)   NOT NULL DEFAULT '',
    shipping_cost   NUMERIC(14,2) NOT NULL CHECK (shipping_cost >= 0),
    created_at      TIMESTAMPTZ   NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ   NOT NULL DEFAULT NOW()
)
"#;

pub const CREATE_ORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id              BIGSERIAL PRIMARY KEY,
    user_id         BIGINT        NOT NULL REFERENCES users (id),
    shop_id         BIGINT        NOT NULL REFERENCES shops (id),
    courier_id      BIGINT        NOT NULL REFERENCES couriers (id),
    status          VARCHAR(16)   NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'shipped', 'delivered', 'cancelled')),
    payment_status  VARCHAR(16)   NOT NULL DEFAULT 'pending'
                    CHECK (payment_status IN ('pending', 'complete')),
    total           NUMERIC(14,2) NOT NULL CHECK (total >= 0),
    created_at      TIMESTAMPTZ   NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ   NOT NULL DEFAULT NOW()
)
"#;

pub const CREATE_ORDERS_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_orders_user_id ON orders (user_id, created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_orders_shop_id ON orders (shop_id, created_at DESC)",
];

pub const CREATE_ORDER_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS order_items (
    id              BIGSERIAL PRIMARY KEY,
    order_id        BIGINT        NOT NULL REFERENCES orders (id),
    product_id      BIGINT        NOT NULL REFERENCES products (id),
    quantity        INTEGER       NOT NULL CHECK (quantity >= 1),
    price           NUMERIC(14,2) NOT NULL CHECK (price >= 0)
)
"#;

pub const CREATE_ORDER_ITEMS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_order_items_order_id ON order_items (order_id)";

/// Run every DDL statement in dependency order.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Initializing PostgreSQL schema...");

    let statements = [
        CREATE_USERS_TABLE,
        CREATE_SHOPS_TABLE,
        CREATE_PRODUCTS_TABLE,
        CREATE_PRODUCTS_SHOP_INDEX,
        CREATE_COURIERS_TABLE,
        CREATE_ORDERS_TABLE,
        CREATE_ORDER_ITEMS_TABLE,
        CREATE_ORDER_ITEMS_INDEX,
    ];
    for sql in statements.iter().chain(CREATE_ORDERS_INDEXES) {
        sqlx::query(sql).execute(pool).await?;
    }

    tracing::info!("PostgreSQL schema initialized successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_and_price_checks_present() {
        assert!(CREATE_PRODUCTS_TABLE.contains("CHECK (stock >= 0)"));
        assert!(CREATE_PRODUCTS_TABLE.contains("CHECK (price >= 0)"));
        assert!(CREATE_ORDER_ITEMS_TABLE.contains("CHECK (quantity >= 1)"));
    }

    #[test]
    fn test_constraint_names_match_conflict_mapping() {
        assert!(CREATE_USERS_TABLE.contains("users_email_key"));
        assert!(CREATE_SHOPS_TABLE.contains("shops_owner_id_key"));
    }
}
