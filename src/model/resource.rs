//! Resource definitions: own fields plus an explicit ancestor chain.

use crate::case::{endpoint_from_name, table_name_from_name};
use crate::error::ConfigError;
use crate::model::{FieldAttribute, RawRow, ResourceFieldDescriptor, ValueType};
use crate::permission::Permissions;
use std::collections::HashSet;
use std::sync::Arc;

/// Property name of the identity field declared by [`base_resource`].
pub const IDENTITY_FIELD: &str = "id";

/// Qualified name of the root ancestor.
pub const BASE_RESOURCE_NAME: &str = "Framework\\Data\\Resource";

/// Qualified name of the value/label list preset.
pub const LIST_RESOURCE_NAME: &str = "Framework\\Data\\DatabaseList";

#[derive(Clone, Debug)]
pub struct ResourceDefinition {
    /// Namespace-qualified type name, e.g. `My\Plugin\ColorsList`.
    pub name: String,
    /// Fields declared by this definition, in declaration order.
    pub own_fields: Vec<ResourceFieldDescriptor>,
    pub parent: Option<Arc<ResourceDefinition>>,
    pub table_name: Option<String>,
    pub endpoint: Option<String>,
    pub permissions: Permissions,
    /// Rows inserted when the resource is enabled.
    pub default_items: Vec<RawRow>,
    pub drop_on_disable: bool,
    pub drop_on_uninstall: bool,
}

impl ResourceDefinition {
    /// Flattened fields: this definition first, then each ancestor in turn.
    /// A property redeclared by a descendant shadows the ancestor's declaration.
    pub fn fields(&self) -> Vec<ResourceFieldDescriptor> {
        let mut out: Vec<ResourceFieldDescriptor> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut current = Some(self);
        while let Some(def) = current {
            for f in &def.own_fields {
                if seen.insert(f.property_name.clone()) {
                    out.push(f.clone());
                }
            }
            current = def.parent.as_deref();
        }
        out
    }

    /// Names of this definition and its ancestors, most-derived first.
    pub fn lineage(&self) -> Vec<&str> {
        let mut out = vec![self.name.as_str()];
        let mut current = self.parent.as_deref();
        while let Some(def) = current {
            out.push(def.name.as_str());
            current = def.parent.as_deref();
        }
        out
    }

    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| endpoint_from_name(&self.name))
    }

    pub fn table_name(&self, prefix: &str) -> String {
        match &self.table_name {
            Some(t) => format!("{}{}", prefix, t),
            None => table_name_from_name(&self.name, prefix),
        }
    }

    /// Storage name of the identity field.
    pub fn key_column(&self) -> String {
        self.fields()
            .into_iter()
            .find(|f| f.property_name == IDENTITY_FIELD)
            .map(|f| f.storage_name)
            .unwrap_or_else(|| IDENTITY_FIELD.to_string())
    }
}

/// Builder for [`ResourceDefinition`]; `build` validates the declaration.
pub struct ResourceBuilder {
    def: ResourceDefinition,
}

impl ResourceBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        ResourceBuilder {
            def: ResourceDefinition {
                name: name.into(),
                own_fields: Vec::new(),
                parent: None,
                table_name: None,
                endpoint: None,
                permissions: Permissions::default(),
                default_items: Vec::new(),
                drop_on_disable: false,
                drop_on_uninstall: true,
            },
        }
    }

    pub fn extends(mut self, parent: Arc<ResourceDefinition>) -> Self {
        self.def.parent = Some(parent);
        self
    }

    pub fn field(
        mut self,
        property_name: impl Into<String>,
        value_type: ValueType,
        attributes: impl IntoIterator<Item = FieldAttribute>,
    ) -> Self {
        self.def.own_fields.push(ResourceFieldDescriptor::new(
            property_name,
            value_type,
            attributes.into_iter().collect(),
        ));
        self
    }

    pub fn table_name(mut self, table: impl Into<String>) -> Self {
        self.def.table_name = Some(table.into());
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.def.endpoint = Some(endpoint.into());
        self
    }

    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.def.permissions = permissions;
        self
    }

    pub fn default_item(mut self, row: RawRow) -> Self {
        self.def.default_items.push(row);
        self
    }

    pub fn drop_on_disable(mut self, drop: bool) -> Self {
        self.def.drop_on_disable = drop;
        self
    }

    pub fn drop_on_uninstall(mut self, drop: bool) -> Self {
        self.def.drop_on_uninstall = drop;
        self
    }

    pub fn build(self) -> Result<ResourceDefinition, ConfigError> {
        let def = self.def;
        if def.lineage().iter().skip(1).any(|n| *n == def.name) {
            return Err(ConfigError::InheritanceCycle(def.name));
        }
        let mut own = HashSet::new();
        for f in &def.own_fields {
            f.check_conflicts()?;
            if !own.insert(f.property_name.as_str()) {
                return Err(ConfigError::DuplicateField {
                    resource: def.name.clone(),
                    field: f.property_name.clone(),
                });
            }
        }
        let mut columns = HashSet::new();
        for f in def.fields() {
            if !columns.insert(f.storage_name.clone()) {
                return Err(ConfigError::DuplicateField {
                    resource: def.name.clone(),
                    field: f.storage_name,
                });
            }
        }
        Ok(def)
    }
}

fn preset(name: &str, own_fields: Vec<ResourceFieldDescriptor>, parent: Option<Arc<ResourceDefinition>>) -> ResourceDefinition {
    ResourceDefinition {
        name: name.to_string(),
        own_fields,
        parent,
        table_name: None,
        endpoint: None,
        permissions: Permissions::default(),
        default_items: Vec::new(),
        drop_on_disable: false,
        drop_on_uninstall: true,
    }
}

/// Root ancestor of every resource: an auto-incremented integer primary key.
pub fn base_resource() -> Arc<ResourceDefinition> {
    Arc::new(preset(
        BASE_RESOURCE_NAME,
        vec![ResourceFieldDescriptor::new(
            IDENTITY_FIELD,
            ValueType::Integer,
            vec![
                FieldAttribute::AutoIncrement,
                FieldAttribute::PrimaryKeyConstraint(None),
                FieldAttribute::Required,
            ],
        )],
        None,
    ))
}

/// Value/label list preset: `value`, a unique `label` and an `inactive` flag.
pub fn list_resource() -> Arc<ResourceDefinition> {
    Arc::new(preset(
        LIST_RESOURCE_NAME,
        vec![
            ResourceFieldDescriptor::new("value", ValueType::String, vec![FieldAttribute::Required]),
            ResourceFieldDescriptor::new(
                "label",
                ValueType::String,
                vec![FieldAttribute::Required, FieldAttribute::UniqueConstraint(None)],
            ),
            ResourceFieldDescriptor::new("inactive", ValueType::Boolean, Vec::new()),
        ],
        Some(base_resource()),
    ))
}

/// Resolve a built-in ancestor by its qualified name.
pub fn builtin(name: &str) -> Option<Arc<ResourceDefinition>> {
    match name {
        BASE_RESOURCE_NAME => Some(base_resource()),
        LIST_RESOURCE_NAME => Some(list_resource()),
        _ => None,
    }
}

/// Builder for a resource extending [`list_resource`].
pub fn database_list(name: impl Into<String>) -> ResourceBuilder {
    ResourceBuilder::new(name).extends(list_resource())
}
