//! Config validation: references, inheritance, identifiers and attribute consistency.

use crate::case::{endpoint_from_name, table_name_from_name};
use crate::config::PluginConfig;
use crate::error::ConfigError;
use crate::model::{ResourceFieldDescriptor, ValueType, BASE_RESOURCE_NAME, LIST_RESOURCE_NAME};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

fn identifier() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"))
}

pub fn is_builtin(name: &str) -> bool {
    name == BASE_RESOURCE_NAME || name == LIST_RESOURCE_NAME
}

/// One URL path segment.
fn endpoint_segment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static regex"))
}

fn check(re: &Regex, kind: &str, name: &str) -> Result<(), ConfigError> {
    if re.is_match(name) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("invalid {} identifier: '{}'", kind, name)))
    }
}

fn check_identifier(kind: &str, name: &str) -> Result<(), ConfigError> {
    check(identifier(), kind, name)
}

/// Full (prefixed) table name, as it will appear in SQL text.
pub fn check_table_name(name: &str) -> Result<(), ConfigError> {
    check_identifier("table", name)
}

pub fn validate(config: &PluginConfig) -> Result<(), ConfigError> {
    let mut by_name = HashMap::new();
    for r in &config.resources {
        if is_builtin(&r.name) || by_name.insert(r.name.as_str(), r).is_some() {
            return Err(ConfigError::Validation(format!("resource '{}' declared twice or reuses a built-in name", r.name)));
        }
    }

    for r in &config.resources {
        if let Some(parent) = r.extends.as_deref() {
            if !is_builtin(parent) && !by_name.contains_key(parent) {
                return Err(ConfigError::MissingReference {
                    kind: "resource",
                    id: parent.to_string(),
                });
            }
        }

        let mut seen = HashSet::new();
        let mut current = r.name.as_str();
        while let Some(parent) = by_name.get(current).and_then(|c| c.extends.as_deref()) {
            if !seen.insert(current) || parent == r.name {
                return Err(ConfigError::InheritanceCycle(r.name.clone()));
            }
            current = parent;
        }

        // The host prefix is checked with the full name when the service is built.
        match &r.table_name {
            Some(t) => check_identifier("table", t)?,
            None => check_identifier("table", &table_name_from_name(&r.name, ""))?,
        }
        match &r.endpoint {
            Some(e) => check(endpoint_segment(), "endpoint", e)?,
            None => check(endpoint_segment(), "endpoint", &endpoint_from_name(&r.name))?,
        }
        let mut names = HashSet::new();
        for f in &r.fields {
            let descriptor = ResourceFieldDescriptor::new(&f.name, ValueType::parse(&f.type_), f.attributes.clone());
            descriptor.check_conflicts()?;
            check_identifier("field", &descriptor.storage_name)?;
            if !names.insert(f.name.as_str()) {
                return Err(ConfigError::DuplicateField {
                    resource: r.name.clone(),
                    field: f.name.clone(),
                });
            }
        }
    }

    for name in &config.api.resources {
        if !by_name.contains_key(name.as_str()) {
            return Err(ConfigError::MissingReference {
                kind: "resource",
                id: name.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, FieldConfig, ResourceConfig};
    use crate::model::FieldAttribute;
    use crate::permission::Permissions;

    fn resource(name: &str, extends: Option<&str>) -> ResourceConfig {
        ResourceConfig {
            name: name.into(),
            extends: extends.map(String::from),
            fields: vec![FieldConfig {
                name: "title".into(),
                type_: "string".into(),
                attributes: vec![FieldAttribute::Required],
            }],
            table_name: None,
            endpoint: None,
            permissions: Permissions::default(),
            default_items: Vec::new(),
            drop_on_disable: false,
            drop_on_uninstall: true,
        }
    }

    fn config(resources: Vec<ResourceConfig>, exposed: &[&str]) -> PluginConfig {
        PluginConfig {
            api: ApiConfig {
                name: "Shop\\API".into(),
                version: 1,
                resources: exposed.iter().map(|s| s.to_string()).collect(),
                namespaces: Default::default(),
            },
            resources,
        }
    }

    #[test]
    fn test_valid() {
        let c = config(
            vec![resource("Shop\\Post", None), resource("Shop\\Page", Some("Shop\\Post"))],
            &["Shop\\Page"],
        );
        assert!(validate(&c).is_ok());
    }

    #[test]
    fn test_missing_parent_and_api_reference() {
        let c = config(vec![resource("Shop\\Page", Some("Shop\\Nope"))], &[]);
        assert!(matches!(validate(&c), Err(ConfigError::MissingReference { .. })));
        let c = config(vec![resource("Shop\\Page", None)], &["Shop\\Other"]);
        assert!(matches!(validate(&c), Err(ConfigError::MissingReference { .. })));
    }

    #[test]
    fn test_cycle() {
        let c = config(
            vec![resource("A", Some("B")), resource("B", Some("A"))],
            &[],
        );
        assert!(matches!(validate(&c), Err(ConfigError::InheritanceCycle(_))));
    }

    #[test]
    fn test_derived_table_name_must_be_identifier() {
        let r = resource("Shop\\Bad Items (x int); DROP TABLE wp_users; --List", None);
        assert!(matches!(validate(&config(vec![r], &[])), Err(ConfigError::Validation(_))));
        let r = resource("Shop\\Bad-Items", None);
        assert!(matches!(validate(&config(vec![r], &[])), Err(ConfigError::Validation(_))));
        assert!(validate(&config(vec![resource("Shop\\GoodItems", None)], &[])).is_ok());
    }

    #[test]
    fn test_endpoint_must_be_path_segment() {
        let mut r = resource("Shop\\Post", None);
        r.endpoint = Some("posts/../admin".into());
        assert!(matches!(validate(&config(vec![r], &[])), Err(ConfigError::Validation(_))));
        let mut r = resource("Shop\\Post", None);
        r.endpoint = Some("blog-posts".into());
        assert!(validate(&config(vec![r], &[])).is_ok());
    }

    #[test]
    fn test_bad_identifier() {
        let mut r = resource("Shop\\Post", None);
        r.fields[0].attributes.push(FieldAttribute::FieldAlias("title; DROP".into()));
        assert!(matches!(validate(&config(vec![r], &[])), Err(ConfigError::Validation(_))));
    }
}
