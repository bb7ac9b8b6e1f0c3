//! Schema derivation: table definition, REST arguments and row transform from ordered field descriptors.

mod cache;
mod column;
mod constraint;
mod dialect;
mod rest;
mod transform;

pub use cache::{ResourceSchema, SchemaCache};
pub use column::{column_type_of, ColumnDef, ColumnType, DEFAULT_STRING_LENGTH};
pub use constraint::{group_constraints, ConstraintDef};
pub use dialect::Dialect;
pub use rest::{rest_type_of, RestArgDef, RestType};
pub use transform::{coerce, RowParser};

use crate::error::ConfigError;
use crate::model::{ResourceFieldDescriptor, IDENTITY_FIELD};

/// Separator between column and constraint definitions in rendered DDL.
const DEFINITION_SEPARATOR: &str = ",\n    ";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedSchema {
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<ConstraintDef>,
    pub rest_fields: Vec<RestArgDef>,
}

/// Derive the schema artifacts. Pure: the same ordered input yields the same output.
pub fn derive_schema(fields: &[ResourceFieldDescriptor]) -> Result<DerivedSchema, ConfigError> {
    let columns = fields
        .iter()
        .map(ColumnDef::from_field)
        .collect::<Result<Vec<_>, _>>()?;
    let rest_fields = fields
        .iter()
        .map(RestArgDef::from_field)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DerivedSchema {
        columns,
        constraints: group_constraints(fields),
        rest_fields,
    })
}

impl DerivedSchema {
    /// Columns then constraints, one per line. Constraint identifiers are left unqualified.
    pub fn definition_body(&self, dialect: Dialect) -> String {
        self.body(dialect, |c| c.render())
    }

    fn body(&self, dialect: Dialect, constraint: impl Fn(&ConstraintDef) -> String) -> String {
        self.columns
            .iter()
            .map(|c| c.render(dialect))
            .chain(self.constraints.iter().map(constraint))
            .collect::<Vec<_>>()
            .join(DEFINITION_SEPARATOR)
    }

    /// Full CREATE TABLE statement. `options` is appended after the closing parenthesis
    /// (e.g. a charset/collation clause).
    pub fn table_definition(&self, table: &str, dialect: Dialect, options: Option<&str>) -> String {
        let options = options
            .filter(|o| !o.trim().is_empty())
            .map(|o| format!(" {}", o.trim()))
            .unwrap_or_default();
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n){}",
            table,
            self.body(dialect, |c| c.render_for(table, dialect)),
            options
        )
    }

    pub fn drop_statement(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", table)
    }

    /// REST arguments in field order; the identity field is left out unless `include_id`.
    pub fn rest_args(&self, include_id: bool) -> Vec<&RestArgDef> {
        self.rest_fields
            .iter()
            .filter(|a| include_id || a.property_name != IDENTITY_FIELD)
            .collect()
    }

    /// REST arguments as a JSON object keyed by argument name.
    pub fn rest_args_json(&self, include_id: bool) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for arg in self.rest_args(include_id) {
            map.insert(
                arg.name.clone(),
                serde_json::to_value(arg).unwrap_or(serde_json::Value::Null),
            );
        }
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldAttribute, ValueType};

    #[test]
    fn test_body_joins_columns_then_constraints() {
        let fields = vec![
            ResourceFieldDescriptor::new(
                "id",
                ValueType::Integer,
                vec![FieldAttribute::PrimaryKeyConstraint(None), FieldAttribute::Required],
            ),
            ResourceFieldDescriptor::new("price", ValueType::Float, vec![]),
        ];
        let schema = derive_schema(&fields).unwrap();
        assert_eq!(
            schema.definition_body(Dialect::MySQL),
            "id INTEGER NOT NULL,\n    price FLOAT,\n    CONSTRAINT PK_id PRIMARY KEY (id)"
        );
        assert_eq!(
            schema.table_definition("wp_items", Dialect::MySQL, Some("DEFAULT CHARSET=utf8mb4")),
            "CREATE TABLE IF NOT EXISTS wp_items (\n    id INTEGER NOT NULL,\n    price FLOAT,\n    CONSTRAINT PK_id PRIMARY KEY (id)\n) DEFAULT CHARSET=utf8mb4"
        );
    }

    #[test]
    fn test_unsupported_type_fails_whole_derivation() {
        let fields = vec![
            ResourceFieldDescriptor::new("ok", ValueType::Integer, vec![]),
            ResourceFieldDescriptor::new("when", ValueType::parse("DateTime"), vec![]),
        ];
        assert!(matches!(
            derive_schema(&fields),
            Err(ConfigError::UnsupportedType { .. })
        ));
    }
}
