//! PostgreSQL storage over a sqlx pool.

use crate::error::AppError;
use crate::model::RawRow;
use crate::schema::Dialect;
use crate::sql::{self, PgBindValue, QueryBuf};
use crate::storage::{Predicate, Storage, TableRef};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};

#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        PgStorage { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn bound(q: &QueryBuf) -> Query<'_, Postgres, sqlx::postgres::PgArguments> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    q.params
        .iter()
        .fold(sqlx::query(&q.sql), |query, p| PgBindValue::from_json(p).bind(query))
}

#[async_trait]
impl Storage for PgStorage {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSQL
    }

    async fn insert(&self, table: &TableRef, fields: &RawRow) -> Result<i64, AppError> {
        let q = sql::insert(table, fields);
        let row = bound(&q).fetch_one(&self.pool).await?;
        if let Ok(id) = row.try_get::<i64, _>(0) {
            return Ok(id);
        }
        let id: i32 = row.try_get(0)?;
        Ok(i64::from(id))
    }

    async fn update_where(&self, table: &TableRef, fields: &RawRow, predicate: &Predicate) -> Result<u64, AppError> {
        let q = sql::update_where(table, fields, predicate);
        Ok(bound(&q).execute(&self.pool).await?.rows_affected())
    }

    async fn delete_where(&self, table: &TableRef, predicate: &Predicate) -> Result<u64, AppError> {
        let q = sql::delete_where(table, predicate);
        Ok(bound(&q).execute(&self.pool).await?.rows_affected())
    }

    async fn select_all(&self, table: &TableRef) -> Result<Vec<RawRow>, AppError> {
        let q = sql::select_all(table);
        let rows = bound(&q).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_map).collect())
    }

    async fn select_one(&self, table: &TableRef, predicate: &Predicate) -> Result<Option<RawRow>, AppError> {
        let q = sql::select_one(table, predicate);
        let row = bound(&q).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(row_to_map))
    }

    async fn execute_ddl(&self, statement: &str) -> Result<(), AppError> {
        tracing::debug!(sql = %statement, "ddl");
        sqlx::query(statement).execute(&self.pool).await?;
        Ok(())
    }
}

fn row_to_map(row: &PgRow) -> RawRow {
    use sqlx::Column;
    let mut map = RawRow::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    map
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::from(n);
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::from(n);
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::from(n);
    }
    if let Ok(Some(n)) = row.try_get::<Option<f32>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(f64::from(n)) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}
