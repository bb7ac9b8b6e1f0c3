//! Column definitions derived from field descriptors.

use crate::error::ConfigError;
use crate::model::{ColumnFlag, ResourceFieldDescriptor, ValueType};
use crate::schema::Dialect;
use std::fmt;

/// VARCHAR length used when a string field declares no `Length`.
pub const DEFAULT_STRING_LENGTH: u32 = 255;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Varchar(u32),
    Boolean,
    Float,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => f.write_str("INTEGER"),
            ColumnType::Varchar(n) => write!(f, "VARCHAR({})", n),
            ColumnType::Boolean => f.write_str("BOOLEAN"),
            ColumnType::Float => f.write_str("FLOAT"),
        }
    }
}

/// Storage column type for a field.
pub fn column_type_of(field: &ResourceFieldDescriptor) -> Result<ColumnType, ConfigError> {
    Ok(match &field.value_type {
        ValueType::Integer => ColumnType::Integer,
        ValueType::String => ColumnType::Varchar(field.length().unwrap_or(DEFAULT_STRING_LENGTH)),
        ValueType::Boolean => ColumnType::Boolean,
        ValueType::Float => ColumnType::Float,
        ValueType::Unsupported(name) => {
            tracing::error!(field = %field.property_name, type_name = %name, "no column type mapping");
            return Err(ConfigError::UnsupportedType {
                field: field.property_name.clone(),
                type_name: name.clone(),
            });
        }
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    /// Flags in attribute declaration order.
    pub flags: Vec<ColumnFlag>,
}

impl ColumnDef {
    pub fn from_field(field: &ResourceFieldDescriptor) -> Result<Self, ConfigError> {
        Ok(ColumnDef {
            name: field.storage_name.clone(),
            column_type: column_type_of(field)?,
            flags: field.attributes.iter().filter_map(|a| a.flag()).collect(),
        })
    }

    /// e.g. `id INTEGER AUTO_INCREMENT NOT NULL`
    pub fn render(&self, dialect: Dialect) -> String {
        let mut def = format!("{} {}", self.name, self.column_type);
        for flag in &self.flags {
            def.push(' ');
            def.push_str(dialect.flag(*flag));
        }
        def
    }
}
