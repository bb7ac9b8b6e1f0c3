//! In-process storage: tables as ordered row maps. Understands the CREATE/DROP statements
//! the framework renders, including their NOT NULL, PRIMARY KEY and UNIQUE clauses;
//! everything else is recorded and ignored.

use crate::error::AppError;
use crate::model::RawRow;
use crate::schema::Dialect;
use crate::storage::{Predicate, Storage, TableRef};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct KeyGroup {
    name: String,
    columns: Vec<String>,
}

/// Column rules read from a CREATE TABLE body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct TableRules {
    not_null: Vec<String>,
    unique: Vec<KeyGroup>,
}

#[derive(Default)]
struct MemTable {
    rows: BTreeMap<i64, RawRow>,
    last_id: i64,
    rules: TableRules,
}

impl MemTable {
    fn check_row(&self, table: &TableRef, id: i64, row: &RawRow) -> Result<(), AppError> {
        for column in self.rules.not_null.iter().filter(|c| **c != table.key) {
            if row.get(column).map_or(true, Value::is_null) {
                return Err(AppError::Persistence(format!(
                    "null value in column '{}' of table '{}' violates not-null constraint",
                    column, table.name
                )));
            }
        }
        for group in &self.rules.unique {
            let values: Vec<&Value> = group.columns.iter().filter_map(|c| row.get(c)).collect();
            if values.len() < group.columns.len() || values.iter().any(|v| v.is_null()) {
                continue;
            }
            let clash = self.rows.iter().any(|(other, existing)| {
                *other != id
                    && group
                        .columns
                        .iter()
                        .zip(&values)
                        .all(|(c, v)| Predicate::eq(c.clone(), (*v).clone()).matches(existing))
            });
            if clash {
                return Err(AppError::Persistence(format!(
                    "duplicate key value violates unique constraint '{}' on table '{}'",
                    group.name, table.name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    dialect: Dialect,
    tables: Mutex<HashMap<String, MemTable>>,
    statements: Mutex<Vec<String>>,
    read_only: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    pub fn with_dialect(dialect: Dialect) -> Self {
        MemoryStorage {
            dialect,
            ..MemoryStorage::default()
        }
    }

    /// Make every mutation fail, as a database rejecting writes would.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// DDL statements executed so far, in order.
    pub fn statements(&self) -> Vec<String> {
        self.statements
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|p| p.into_inner().clone())
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables().contains_key(name)
    }

    fn tables(&self) -> MutexGuard<'_, HashMap<String, MemTable>> {
        self.tables.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(AppError::Persistence("storage is read-only".into()));
        }
        Ok(())
    }
}

fn missing(table: &str) -> AppError {
    AppError::Persistence(format!("table '{}' does not exist", table))
}

/// Table name following `CREATE TABLE [IF NOT EXISTS]` or `DROP TABLE [IF EXISTS]`.
fn statement_target(statement: &str) -> Option<(&'static str, String, bool)> {
    let words: Vec<&str> = statement.split_whitespace().collect();
    let upper: Vec<String> = words.iter().map(|w| w.to_uppercase()).collect();
    let (verb, rest) = match upper.as_slice() {
        [a, b, ..] if a == "CREATE" && b == "TABLE" => ("create", 2),
        [a, b, ..] if a == "DROP" && b == "TABLE" => ("drop", 2),
        _ => return None,
    };
    let mut i = rest;
    let mut guarded = false;
    if upper.get(i).map(String::as_str) == Some("IF") {
        guarded = true;
        i += if verb == "create" { 3 } else { 2 };
    }
    let name = words.get(i)?.split('(').next()?.trim_end_matches(';').to_string();
    if name.is_empty() {
        return None;
    }
    Some((verb, name, guarded))
}

/// Split on commas outside parentheses.
fn split_definitions(body: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                out.push(body[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(body[start..].trim());
    out.retain(|d| !d.is_empty());
    out
}

fn column_list(definition: &str) -> Vec<String> {
    let (Some(open), Some(close)) = (definition.find('('), definition.rfind(')')) else {
        return Vec::new();
    };
    definition[open + 1..close]
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

fn table_rules(statement: &str) -> TableRules {
    let mut rules = TableRules::default();
    let (Some(open), Some(close)) = (statement.find('('), statement.rfind(')')) else {
        return rules;
    };
    for definition in split_definitions(&statement[open + 1..close]) {
        let mut words = definition.split_whitespace();
        let first = words.next().unwrap_or_default();
        let rest: Vec<String> = words.clone().map(str::to_uppercase).collect();
        let upper = rest.join(" ");
        let keyed = rest.iter().any(|w| w == "UNIQUE") || upper.contains("PRIMARY KEY");
        let first_upper = first.to_uppercase();
        if first_upper == "CONSTRAINT" {
            if keyed {
                rules.unique.push(KeyGroup {
                    name: words.next().unwrap_or_default().to_string(),
                    columns: column_list(definition),
                });
            }
        } else if first_upper == "UNIQUE" || first_upper == "PRIMARY" || first_upper.starts_with("UNIQUE(") {
            let columns = column_list(definition);
            rules.unique.push(KeyGroup {
                name: columns.join("_"),
                columns,
            });
        } else {
            let column = first.to_string();
            if upper.contains("NOT NULL") {
                rules.not_null.push(column.clone());
            }
            if keyed {
                rules.unique.push(KeyGroup {
                    name: column.clone(),
                    columns: vec![column],
                });
            }
        }
    }
    rules
}

#[async_trait]
impl Storage for MemoryStorage {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn insert(&self, table: &TableRef, fields: &RawRow) -> Result<i64, AppError> {
        self.check_writable()?;
        let mut tables = self.tables();
        let t = tables.get_mut(&table.name).ok_or_else(|| missing(&table.name))?;
        let id = match fields.get(&table.key).and_then(Value::as_i64) {
            Some(id) => id,
            None => t.last_id + 1,
        };
        if t.rows.contains_key(&id) {
            return Err(AppError::Persistence(format!(
                "duplicate key {} in table '{}'",
                id, table.name
            )));
        }
        let mut row = fields.clone();
        row.insert(table.key.clone(), Value::from(id));
        t.check_row(table, id, &row)?;
        t.rows.insert(id, row);
        t.last_id = t.last_id.max(id);
        Ok(id)
    }

    async fn update_where(&self, table: &TableRef, fields: &RawRow, predicate: &Predicate) -> Result<u64, AppError> {
        self.check_writable()?;
        let mut tables = self.tables();
        let t = tables.get_mut(&table.name).ok_or_else(|| missing(&table.name))?;
        let mut updated = Vec::new();
        for (id, row) in t.rows.iter().filter(|(_, r)| predicate.matches(r)) {
            let mut row = row.clone();
            for (k, v) in fields {
                if *k != table.key {
                    row.insert(k.clone(), v.clone());
                }
            }
            t.check_row(table, *id, &row)?;
            updated.push((*id, row));
        }
        // Checked against the pre-update rows.
        let affected = updated.len() as u64;
        t.rows.extend(updated);
        Ok(affected)
    }

    async fn delete_where(&self, table: &TableRef, predicate: &Predicate) -> Result<u64, AppError> {
        self.check_writable()?;
        let mut tables = self.tables();
        let t = tables.get_mut(&table.name).ok_or_else(|| missing(&table.name))?;
        let before = t.rows.len();
        t.rows.retain(|_, r| !predicate.matches(r));
        Ok((before - t.rows.len()) as u64)
    }

    async fn select_all(&self, table: &TableRef) -> Result<Vec<RawRow>, AppError> {
        let tables = self.tables();
        let t = tables.get(&table.name).ok_or_else(|| missing(&table.name))?;
        Ok(t.rows.values().cloned().collect())
    }

    async fn select_one(&self, table: &TableRef, predicate: &Predicate) -> Result<Option<RawRow>, AppError> {
        let tables = self.tables();
        let t = tables.get(&table.name).ok_or_else(|| missing(&table.name))?;
        Ok(t.rows.values().find(|r| predicate.matches(r)).cloned())
    }

    async fn execute_ddl(&self, statement: &str) -> Result<(), AppError> {
        self.check_writable()?;
        tracing::debug!(sql = %statement, "ddl");
        self.statements
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(statement.to_string());
        let mut tables = self.tables();
        match statement_target(statement) {
            Some(("create", name, guarded)) => {
                if tables.contains_key(&name) && !guarded {
                    return Err(AppError::Persistence(format!("table '{}' already exists", name)));
                }
                tables.entry(name).or_insert_with(|| MemTable {
                    rules: table_rules(statement),
                    ..MemTable::default()
                });
            }
            Some((_, name, guarded)) => {
                if tables.remove(&name).is_none() && !guarded {
                    return Err(missing(&name));
                }
            }
            None => {}
        }
        Ok(())
    }
}
