//! Named table constraints grouped across fields.

use crate::model::{ConstraintKind, ResourceFieldDescriptor};
use crate::schema::Dialect;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstraintDef {
    pub kind: ConstraintKind,
    /// Explicit attribute name, or the owning field's storage name.
    pub name: String,
    /// Storage names in discovery order.
    pub columns: Vec<String>,
}

impl ConstraintDef {
    /// `PK_id`, `UC_label`.
    pub fn identifier(&self) -> String {
        format!("{}_{}", self.kind.prefix(), self.name)
    }

    /// e.g. `CONSTRAINT PK_id PRIMARY KEY (id)`
    pub fn render(&self) -> String {
        self.render_named(&self.identifier())
    }

    /// Constraint clause for `table`. PostgreSQL backs PRIMARY KEY and UNIQUE with
    /// schema-wide index names, so there the identifier is prefixed with the table.
    pub fn render_for(&self, table: &str, dialect: Dialect) -> String {
        match dialect {
            Dialect::MySQL => self.render(),
            Dialect::PostgreSQL => self.render_named(&format!("{}_{}", table, self.identifier())),
        }
    }

    fn render_named(&self, identifier: &str) -> String {
        format!(
            "CONSTRAINT {} {} ({})",
            identifier,
            self.kind.keyword(),
            self.columns.join(", ")
        )
    }
}

/// Group constraint attributes by (kind, resolved name), keeping first-seen order.
pub fn group_constraints(fields: &[ResourceFieldDescriptor]) -> Vec<ConstraintDef> {
    let mut out: Vec<ConstraintDef> = Vec::new();
    for field in fields {
        for attr in &field.attributes {
            let Some((kind, name)) = attr.constraint() else { continue };
            let name = name.unwrap_or(&field.storage_name);
            match out.iter_mut().find(|c| c.kind == kind && c.name == name) {
                Some(existing) => {
                    if !existing.columns.contains(&field.storage_name) {
                        existing.columns.push(field.storage_name.clone());
                    }
                }
                None => out.push(ConstraintDef {
                    kind,
                    name: name.to_string(),
                    columns: vec![field.storage_name.clone()],
                }),
            }
        }
    }
    out
}
