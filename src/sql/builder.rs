//! Builds parameterized INSERT, SELECT, UPDATE, DELETE for one table.
//! Identifiers come from validated resource declarations; values are always parameters.

use crate::model::RawRow;
use crate::storage::{Predicate, TableRef};
use serde_json::Value;

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Placeholder for a column value. Nulls are inlined so the column type decides.
    fn value_slot(&mut self, v: &Value) -> String {
        if v.is_null() {
            "NULL".to_string()
        } else {
            format!("${}", self.push_param(v.clone()))
        }
    }
}

/// INSERT the given columns, returning the generated key.
pub fn insert(table: &TableRef, fields: &RawRow) -> QueryBuf {
    let mut q = QueryBuf::default();
    if fields.is_empty() {
        q.sql = format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table.name, table.key);
        return q;
    }
    let mut cols = Vec::with_capacity(fields.len());
    let mut placeholders = Vec::with_capacity(fields.len());
    for (name, value) in fields {
        cols.push(name.as_str());
        placeholders.push(q.value_slot(value));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table.name,
        cols.join(", "),
        placeholders.join(", "),
        table.key
    );
    q
}

/// UPDATE matching rows. With no fields the key is assigned to itself so the
/// affected count still reports matches.
pub fn update_where(table: &TableRef, fields: &RawRow, predicate: &Predicate) -> QueryBuf {
    let mut q = QueryBuf::default();
    let mut sets = Vec::new();
    for (name, value) in fields {
        if *name == table.key {
            continue;
        }
        let slot = q.value_slot(value);
        sets.push(format!("{} = {}", name, slot));
    }
    if sets.is_empty() {
        sets.push(format!("{} = {}", table.key, table.key));
    }
    let n = q.push_param(predicate.value.clone());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}",
        table.name,
        sets.join(", "),
        predicate.column,
        n
    );
    q
}

pub fn delete_where(table: &TableRef, predicate: &Predicate) -> QueryBuf {
    let mut q = QueryBuf::default();
    let n = q.push_param(predicate.value.clone());
    q.sql = format!("DELETE FROM {} WHERE {} = ${}", table.name, predicate.column, n);
    q
}

pub fn select_all(table: &TableRef) -> QueryBuf {
    QueryBuf {
        sql: format!("SELECT * FROM {} ORDER BY {}", table.name, table.key),
        params: Vec::new(),
    }
}

pub fn select_one(table: &TableRef, predicate: &Predicate) -> QueryBuf {
    let mut q = QueryBuf::default();
    let n = q.push_param(predicate.value.clone());
    q.sql = format!(
        "SELECT * FROM {} WHERE {} = ${} LIMIT 1",
        table.name, predicate.column, n
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> TableRef {
        TableRef::new("wp_colors", "id")
    }

    #[test]
    fn test_insert() {
        let fields = json!({"label": "Red", "value": "red"}).as_object().cloned().unwrap();
        let q = insert(&table(), &fields);
        assert_eq!(q.sql, "INSERT INTO wp_colors (label, value) VALUES ($1, $2) RETURNING id");
        assert_eq!(q.params, vec![json!("Red"), json!("red")]);
        assert_eq!(
            insert(&table(), &RawRow::new()).sql,
            "INSERT INTO wp_colors DEFAULT VALUES RETURNING id"
        );
    }

    #[test]
    fn test_update_skips_key() {
        let fields = json!({"id": 9, "label": "Blue"}).as_object().cloned().unwrap();
        let q = update_where(&table(), &fields, &Predicate::eq("id", 4));
        assert_eq!(q.sql, "UPDATE wp_colors SET label = $1 WHERE id = $2");
        assert_eq!(q.params, vec![json!("Blue"), json!(4)]);
    }

    #[test]
    fn test_nulls_are_inlined() {
        let fields = json!({"inactive": null, "label": "Red"}).as_object().cloned().unwrap();
        let q = insert(&table(), &fields);
        assert_eq!(q.sql, "INSERT INTO wp_colors (inactive, label) VALUES (NULL, $1) RETURNING id");
        assert_eq!(q.params, vec![json!("Red")]);
        let q = update_where(&table(), &fields, &Predicate::eq("id", 2));
        assert_eq!(q.sql, "UPDATE wp_colors SET inactive = NULL, label = $1 WHERE id = $2");
    }

    #[test]
    fn test_select_and_delete() {
        assert_eq!(select_all(&table()).sql, "SELECT * FROM wp_colors ORDER BY id");
        assert_eq!(
            select_one(&table(), &Predicate::eq("id", 1)).sql,
            "SELECT * FROM wp_colors WHERE id = $1 LIMIT 1"
        );
        assert_eq!(
            delete_where(&table(), &Predicate::eq("id", 1)).sql,
            "DELETE FROM wp_colors WHERE id = $1"
        );
    }
}
