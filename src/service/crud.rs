//! Resource CRUD driven by the derived schema, persisted through a [`Storage`].

use crate::config::{check_table_name, Settings};
use crate::error::{AppError, ConfigError};
use crate::model::{RawRow, Record, ResourceDefinition};
use crate::schema::{ResourceSchema, SchemaCache};
use crate::service::RequestValidator;
use crate::storage::{Predicate, Storage, TableRef};
use serde_json::Value;
use std::sync::Arc;

pub struct ResourceService {
    definition: Arc<ResourceDefinition>,
    schema: Arc<ResourceSchema>,
    storage: Arc<dyn Storage>,
    table: TableRef,
    table_options: Option<String>,
}

impl std::fmt::Debug for ResourceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceService")
            .field("definition", &self.definition)
            .field("schema", &self.schema)
            .field("table", &self.table)
            .field("table_options", &self.table_options)
            .finish_non_exhaustive()
    }
}

impl ResourceService {
    /// Derives (or reuses) the resource's schema. Fails eagerly on declaration defects.
    pub fn new(
        definition: Arc<ResourceDefinition>,
        storage: Arc<dyn Storage>,
        cache: &SchemaCache,
        settings: &Settings,
    ) -> Result<Self, ConfigError> {
        let schema = cache.get_or_derive(&definition)?;
        let table = TableRef::new(definition.table_name(&settings.table_prefix), definition.key_column());
        check_table_name(&table.name)?;
        Ok(ResourceService {
            definition,
            schema,
            storage,
            table,
            table_options: settings.table_options.clone(),
        })
    }

    pub fn definition(&self) -> &ResourceDefinition {
        &self.definition
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn endpoint(&self) -> String {
        self.definition.endpoint()
    }

    /// CREATE TABLE statement in the storage's dialect.
    pub fn table_definition(&self) -> String {
        self.schema.derived.table_definition(
            &self.table.name,
            self.storage.dialect(),
            self.table_options.as_deref(),
        )
    }

    pub fn drop_statement(&self) -> String {
        self.schema.derived.drop_statement(&self.table.name)
    }

    pub fn rest_args(&self, include_id: bool) -> Value {
        self.schema.derived.rest_args_json(include_id)
    }

    fn key(&self, id: i64) -> Predicate {
        Predicate::eq(self.table.key.clone(), id)
    }

    fn parse(&self, row: Option<&RawRow>) -> Result<Option<Record>, AppError> {
        Ok(self.schema.parser.parse_row(row)?)
    }

    fn to_storage(&self, data: &RawRow) -> Result<RawRow, AppError> {
        self.schema
            .parser
            .to_storage(data)
            .map_err(|e| AppError::Validation(e.to_string()))
    }

    /// All rows, parsed. Empty when the table has no rows.
    pub async fn list(&self) -> Result<Vec<Record>, AppError> {
        let rows = self.storage.select_all(&self.table).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(rec) = self.parse(Some(row))? {
                out.push(rec);
            }
        }
        Ok(out)
    }

    /// Insert one record and return it as stored.
    pub async fn create(&self, data: &RawRow) -> Result<Record, AppError> {
        RequestValidator::validate(data, &self.schema.derived.rest_args(false))?;
        let fields = self.to_storage(data)?;
        let id = self
            .storage
            .insert(&self.table, &fields)
            .await
            .map_err(|e| persistence("create", &self.table.name, e))?;
        self.get(id).await?.ok_or_else(|| {
            persistence(
                "create",
                &self.table.name,
                AppError::NotFound(format!("inserted row {}", id)),
            )
        })
    }

    pub async fn get(&self, id: i64) -> Result<Option<Record>, AppError> {
        let row = self.storage.select_one(&self.table, &self.key(id)).await?;
        self.parse(row.as_ref())
    }

    /// Update one record. `None` when no row has this id.
    pub async fn update(&self, id: i64, data: &RawRow) -> Result<Option<Record>, AppError> {
        RequestValidator::validate_partial(data, &self.schema.derived.rest_args(false))?;
        let fields = self.to_storage(data)?;
        if self.storage.select_one(&self.table, &self.key(id)).await?.is_none() {
            return Ok(None);
        }
        let affected = self
            .storage
            .update_where(&self.table, &fields, &self.key(id))
            .await
            .map_err(|e| persistence("update", &self.table.name, e))?;
        if affected == 0 {
            return Err(persistence(
                "update",
                &self.table.name,
                AppError::Persistence("no rows affected".into()),
            ));
        }
        self.get(id).await
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let affected = self.storage.delete_where(&self.table, &self.key(id)).await?;
        Ok(affected > 0)
    }
}

fn persistence(op: &str, table: &str, e: AppError) -> AppError {
    let msg = match e {
        AppError::Persistence(m) => m,
        other => other.to_string(),
    };
    tracing::error!(op, table, error = %msg, "write failed");
    AppError::Persistence(format!("{}() failed on {}: {}", op, table, msg))
}
