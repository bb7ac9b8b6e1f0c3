//! Storage collaborator: row-oriented persistence primitives the resource runtime drives.

mod memory;
mod postgres;

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

use crate::error::AppError;
use crate::model::RawRow;
use crate::schema::Dialect;
use async_trait::async_trait;
use serde_json::Value;

/// Table name plus its identity column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
    pub key: String,
}

impl TableRef {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        TableRef {
            name: name.into(),
            key: key.into(),
        }
    }
}

/// Equality match on one column.
#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub value: Value,
}

impl Predicate {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, row: &RawRow) -> bool {
        row.get(&self.column).is_some_and(|v| loose_eq(v, &self.value))
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => {
            s.trim().parse::<f64>().ok() == n.as_f64()
        }
        _ => a == b,
    }
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Dialect that `execute_ddl` understands.
    fn dialect(&self) -> Dialect;

    /// Insert one row; returns the generated identity.
    async fn insert(&self, table: &TableRef, fields: &RawRow) -> Result<i64, AppError>;

    /// Returns the number of affected rows.
    async fn update_where(&self, table: &TableRef, fields: &RawRow, predicate: &Predicate) -> Result<u64, AppError>;

    async fn delete_where(&self, table: &TableRef, predicate: &Predicate) -> Result<u64, AppError>;

    async fn select_all(&self, table: &TableRef) -> Result<Vec<RawRow>, AppError>;

    async fn select_one(&self, table: &TableRef, predicate: &Predicate) -> Result<Option<RawRow>, AppError>;

    async fn execute_ddl(&self, statement: &str) -> Result<(), AppError>;
}
