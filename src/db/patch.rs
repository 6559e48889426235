//! Partial updates.
//!
//! A patch type lists the columns it changes; the Postgres repositories turn
//! that list into one `UPDATE ... RETURNING` statement and the in-memory store
//! applies the same fields to its copy.

use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};

use crate::error::{AppError, AppResult};

/// A bound value for one column of an update.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    Text(String),
    Int(i32),
    Money(Decimal),
}

pub trait Patch {
    /// `(column, value)` for every field that is set, in a stable order.
    fn fields(&self) -> Vec<(&'static str, PatchValue)>;

    fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

/// Render `UPDATE {table} SET col = $n, ..., updated_at = NOW() WHERE id = $m RETURNING {returning}`.
///
/// Fails with a validation error when the patch sets nothing.
pub fn update_query(
    table: &str,
    id: i64,
    patch: &dyn Patch,
    returning: &str,
) -> AppResult<QueryBuilder<'static, Postgres>> {
    let fields = patch.fields();
    if fields.is_empty() {
        return Err(AppError::validation("no fields to update"));
    }

    let mut qb = QueryBuilder::new(format!("UPDATE {table} SET "));
    for (column, value) in fields {
        qb.push(column);
        qb.push(" = ");
        match value {
            PatchValue::Text(v) => {
                qb.push_bind(v);
            }
            PatchValue::Int(v) => {
                qb.push_bind(v);
            }
            PatchValue::Money(v) => {
                qb.push_bind(v);
            }
        }
        qb.push(", ");
    }
    qb.push("updated_at = NOW() WHERE id = ");
    qb.push_bind(id);
    qb.push(" RETURNING ");
    qb.push(returning);
    Ok(qb)
}

/// Push `name` onto `fields` when `value` is set.
pub(crate) fn push_text(
    fields: &mut Vec<(&'static str, PatchValue)>,
    name: &'static str,
    value: &Option<String>,
) {
    if let Some(v) = value {
        fields.push((name, PatchValue::Text(v.clone())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        name: Option<String>,
        stock: Option<i32>,
        price: Option<Decimal>,
    }

    impl Patch for Probe {
        fn fields(&self) -> Vec<(&'static str, PatchValue)> {
            let mut fields = Vec::new();
            push_text(&mut fields, "name", &self.name);
            if let Some(v) = self.stock {
                fields.push(("stock", PatchValue::Int(v)));
            }
            if let Some(v) = self.price {
                fields.push(("price", PatchValue::Money(v)));
            }
            fields
        }
    }

    #[test]
    fn test_update_sql_shape() {
        let probe = Probe {
            name: Some("Lamp".into()),
            stock: None,
            price: Some(Decimal::new(1999, 2)),
        };
        let qb = update_query("products", 7, &probe, "id, name").unwrap();
        assert_eq!(
            qb.sql(),
            "UPDATE products SET name = $1, price = $2, updated_at = NOW() WHERE id = $3 RETURNING id, name"
        );
    }

    #[test]
    fn test_empty_patch_rejected() {
        let probe = Probe {
            name: None,
            stock: None,
            price: None,
        };
        assert!(probe.is_empty());
        let err = update_query("products", 1, &probe, "id").err().expect("empty patch must be rejected");
        assert!(matches!(err, AppError::Validation(_)));
    }
}
