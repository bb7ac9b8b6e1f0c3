//! Field attributes: storage flags, aliases and table-level constraints.

use serde::{Deserialize, Serialize};

/// Declarative annotation attached to one resource field.
///
/// JSON form: `"required"`, `"auto_increment"`, `{"length": 64}`, `{"alias": "col"}`,
/// `{"primary_key": null}`, `{"unique": "uc_name"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldAttribute {
    AutoIncrement,
    Required,
    Length(u32),
    #[serde(rename = "alias")]
    FieldAlias(String),
    #[serde(rename = "primary_key")]
    PrimaryKeyConstraint(Option<String>),
    #[serde(rename = "unique")]
    UniqueConstraint(Option<String>),
}

/// Column-level flag produced by an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnFlag {
    NotNull,
    AutoIncrement,
}

/// Table-level constraint kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
}

impl ConstraintKind {
    /// Prefix used in generated constraint names (`PK_id`, `UC_label`).
    pub fn prefix(self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "PK",
            ConstraintKind::Unique => "UC",
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "PRIMARY KEY",
            ConstraintKind::Unique => "UNIQUE",
        }
    }
}

impl FieldAttribute {
    pub fn flag(&self) -> Option<ColumnFlag> {
        match self {
            FieldAttribute::Required => Some(ColumnFlag::NotNull),
            FieldAttribute::AutoIncrement => Some(ColumnFlag::AutoIncrement),
            _ => None,
        }
    }

    /// Constraint kind and explicit name, if this attribute is a table-level constraint.
    /// An empty name counts as absent.
    pub fn constraint(&self) -> Option<(ConstraintKind, Option<&str>)> {
        let (kind, name) = match self {
            FieldAttribute::PrimaryKeyConstraint(n) => (ConstraintKind::PrimaryKey, n),
            FieldAttribute::UniqueConstraint(n) => (ConstraintKind::Unique, n),
            _ => return None,
        };
        Some((kind, name.as_deref().filter(|n| !n.is_empty())))
    }

    pub fn is_required(&self) -> bool {
        matches!(self, FieldAttribute::Required)
    }
}
