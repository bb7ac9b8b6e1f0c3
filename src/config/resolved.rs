//! Resolved plugin model: config validated and turned into linked resource definitions.

use crate::case::api_root_from_name;
use crate::config::{validate, PluginConfig, ResourceConfig};
use crate::error::ConfigError;
use crate::model::{base_resource, builtin, ResourceBuilder, ResourceDefinition, ValueType};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct ResolvedPlugin {
    pub api_name: String,
    pub version: u32,
    /// Exposed resources in API registration order.
    pub resources: Vec<Arc<ResourceDefinition>>,
    /// Every configured resource, including ones only used as ancestors.
    pub by_name: HashMap<String, Arc<ResourceDefinition>>,
    /// Source roots per namespace, for the plugin's symbol locator.
    pub namespaces: BTreeMap<String, Vec<PathBuf>>,
}

impl ResolvedPlugin {
    /// Route namespace, e.g. `my/shop/v1` for `My\Shop\API` version 1.
    pub fn api_root(&self) -> String {
        api_root_from_name(&self.api_name, self.version)
    }

    pub fn resource(&self, name: &str) -> Option<&Arc<ResourceDefinition>> {
        self.by_name.get(name)
    }
}

/// Validate config and link every resource to its ancestors.
pub fn resolve(config: &PluginConfig) -> Result<ResolvedPlugin, ConfigError> {
    validate(config)?;
    let raw: HashMap<&str, &ResourceConfig> =
        config.resources.iter().map(|r| (r.name.as_str(), r)).collect();

    let mut built: HashMap<String, Arc<ResourceDefinition>> = HashMap::new();
    for r in &config.resources {
        build(r.name.as_str(), &raw, &mut built, &mut Vec::new())?;
    }

    let mut resources = Vec::with_capacity(config.api.resources.len());
    let mut endpoints = HashSet::new();
    for name in &config.api.resources {
        let def = built.get(name).cloned().ok_or_else(|| ConfigError::MissingReference {
            kind: "resource",
            id: name.clone(),
        })?;
        let endpoint = def.endpoint();
        if !endpoints.insert(endpoint.clone()) {
            return Err(ConfigError::DuplicateEndpoint(endpoint));
        }
        resources.push(def);
    }

    tracing::debug!(
        api = %config.api.name,
        exposed = resources.len(),
        defined = built.len(),
        "plugin resolved"
    );
    Ok(ResolvedPlugin {
        api_name: config.api.name.clone(),
        version: config.api.version,
        resources,
        by_name: built,
        namespaces: config.api.namespaces.clone(),
    })
}

fn build(
    name: &str,
    raw: &HashMap<&str, &ResourceConfig>,
    built: &mut HashMap<String, Arc<ResourceDefinition>>,
    stack: &mut Vec<String>,
) -> Result<Arc<ResourceDefinition>, ConfigError> {
    if let Some(def) = built.get(name) {
        return Ok(def.clone());
    }
    if let Some(def) = builtin(name) {
        return Ok(def);
    }
    if stack.iter().any(|n| n == name) {
        return Err(ConfigError::InheritanceCycle(name.to_string()));
    }
    let cfg = raw.get(name).ok_or_else(|| ConfigError::MissingReference {
        kind: "resource",
        id: name.to_string(),
    })?;

    stack.push(name.to_string());
    let parent = match cfg.extends.as_deref() {
        Some(p) => build(p, raw, built, stack)?,
        None => base_resource(),
    };
    stack.pop();

    let mut builder = ResourceBuilder::new(&cfg.name)
        .extends(parent)
        .permissions(cfg.permissions.clone())
        .drop_on_disable(cfg.drop_on_disable)
        .drop_on_uninstall(cfg.drop_on_uninstall);
    for f in &cfg.fields {
        builder = builder.field(&f.name, ValueType::parse(&f.type_), f.attributes.clone());
    }
    if let Some(t) = &cfg.table_name {
        builder = builder.table_name(t);
    }
    if let Some(e) = &cfg.endpoint {
        builder = builder.endpoint(e);
    }
    for row in &cfg.default_items {
        builder = builder.default_item(row.clone());
    }

    let def = Arc::new(builder.build()?);
    built.insert(name.to_string(), def.clone());
    Ok(def)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, FieldConfig};
    use crate::model::{FieldAttribute, LIST_RESOURCE_NAME};
    use crate::permission::Permissions;

    fn resource(name: &str, extends: Option<&str>, endpoint: Option<&str>) -> ResourceConfig {
        ResourceConfig {
            name: name.into(),
            extends: extends.map(String::from),
            fields: vec![FieldConfig {
                name: "title".into(),
                type_: "string".into(),
                attributes: vec![FieldAttribute::Length(80)],
            }],
            table_name: None,
            endpoint: endpoint.map(String::from),
            permissions: Permissions::default(),
            default_items: Vec::new(),
            drop_on_disable: false,
            drop_on_uninstall: true,
        }
    }

    fn plugin(resources: Vec<ResourceConfig>, exposed: &[&str]) -> PluginConfig {
        PluginConfig {
            api: ApiConfig {
                name: "My\\Shop\\API".into(),
                version: 2,
                resources: exposed.iter().map(|s| s.to_string()).collect(),
                namespaces: Default::default(),
            },
            resources,
        }
    }

    #[test]
    fn test_resolve_links_ancestors() {
        let c = plugin(
            vec![
                resource("My\\Shop\\ProductResource", Some("My\\Shop\\Base"), None),
                resource("My\\Shop\\Base", None, None),
                resource("My\\Shop\\ColorsList", Some(LIST_RESOURCE_NAME), None),
            ],
            &["My\\Shop\\ProductResource", "My\\Shop\\ColorsList"],
        );
        let resolved = resolve(&c).unwrap();
        assert_eq!(resolved.api_root(), "my/shop/v2");
        assert_eq!(resolved.resources.len(), 2);
        assert_eq!(resolved.by_name.len(), 3);
        let product = resolved.resource("My\\Shop\\ProductResource").unwrap();
        assert_eq!(product.endpoint(), "product");
        assert_eq!(product.lineage().len(), 3);
        let colors = &resolved.resources[1];
        assert_eq!(colors.fields().len(), 5);
    }

    #[test]
    fn test_duplicate_endpoint() {
        let c = plugin(
            vec![
                resource("A\\Thing", None, Some("things")),
                resource("B\\Other", None, Some("things")),
            ],
            &["A\\Thing", "B\\Other"],
        );
        assert_eq!(
            resolve(&c).unwrap_err(),
            ConfigError::DuplicateEndpoint("things".into())
        );
    }
}
