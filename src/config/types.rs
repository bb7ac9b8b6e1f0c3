//! Raw config types matching the JSON plugin definition files, plus runtime settings.

use crate::locator::DEFAULT_SOURCE_EXTENSION;
use crate::model::{FieldAttribute, RawRow};
use crate::permission::Permissions;
use crate::schema::Dialect;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub attributes: Vec<FieldAttribute>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Namespace-qualified type name.
    pub name: String,
    /// Parent resource: another configured resource or a built-in. Defaults to the base resource.
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default)]
    pub default_items: Vec<RawRow>,
    #[serde(default)]
    pub drop_on_disable: bool,
    #[serde(default = "default_true")]
    pub drop_on_uninstall: bool,
}

fn default_true() -> bool {
    true
}

fn default_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Namespace-qualified API type name, e.g. `My\Shop\API`.
    pub name: String,
    #[serde(default = "default_version")]
    pub version: u32,
    /// Resource names exposed by this API, in registration order.
    #[serde(default)]
    pub resources: Vec<String>,
    /// Source roots per namespace. Paths are relative to the config directory;
    /// `load_from_dir` rewrites them to joined paths.
    #[serde(default)]
    pub namespaces: BTreeMap<String, Vec<PathBuf>>,
}

/// Everything a plugin declares, loaded from `api.json` and `resources.json`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PluginConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

/// Host-facing runtime settings.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Prepended to every derived table name.
    pub table_prefix: String,
    /// Appended to CREATE TABLE statements (charset/collation clause).
    pub table_options: Option<String>,
    pub dialect: Dialect,
    pub source_extension: String,
    /// Maximum accepted request body, in bytes.
    pub body_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            table_prefix: "wp_".into(),
            table_options: None,
            dialect: Dialect::default(),
            source_extension: DEFAULT_SOURCE_EXTENSION.into(),
            body_limit: 1024 * 1024,
        }
    }
}
