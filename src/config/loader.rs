//! Load plugin config from JSON files and settings from the environment.

use crate::config::{validate, ApiConfig, PluginConfig, ResourceConfig, Settings};
use crate::error::ConfigError;
use crate::schema::Dialect;
use std::path::{Component, Path, PathBuf};

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&text).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
}

/// `relative` joined onto `dir`. Leading separators are dropped, so every root stays under `dir`.
fn join_relative(dir: &Path, relative: &Path) -> PathBuf {
    relative
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .fold(dir.to_path_buf(), |acc, c| acc.join(c))
}

/// Load `api.json` and `resources.json` (optional, defaults to none) from a directory,
/// then validate.
pub async fn load_from_dir(dir: impl AsRef<Path>) -> Result<PluginConfig, ConfigError> {
    let dir = dir.as_ref();
    let mut api: ApiConfig = read_json(&dir.join("api.json")).await?;
    for roots in api.namespaces.values_mut() {
        for root in roots.iter_mut() {
            *root = join_relative(dir, root);
        }
    }
    let resources_path = dir.join("resources.json");
    let resources: Vec<ResourceConfig> = if tokio::fs::try_exists(&resources_path).await.unwrap_or(false) {
        read_json(&resources_path).await?
    } else {
        tracing::warn!(dir = %dir.display(), "no resources.json, api has no resources");
        Vec::new()
    };
    let config = PluginConfig { api, resources };
    validate(&config)?;
    tracing::info!(
        api = %config.api.name,
        resources = config.resources.len(),
        namespaces = config.api.namespaces.len(),
        "plugin config loaded"
    );
    Ok(config)
}

impl Settings {
    /// Settings from `PLUGIN_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut s = Settings::default();
        if let Ok(prefix) = std::env::var("PLUGIN_TABLE_PREFIX") {
            s.table_prefix = prefix;
        }
        if let Ok(options) = std::env::var("PLUGIN_TABLE_OPTIONS") {
            s.table_options = Some(options).filter(|o| !o.trim().is_empty());
        }
        if let Ok(d) = std::env::var("PLUGIN_SQL_DIALECT") {
            s.dialect = Dialect::from_name(&d)
                .ok_or_else(|| ConfigError::Validation(format!("unknown sql dialect: {}", d)))?;
        }
        if let Ok(ext) = std::env::var("PLUGIN_SOURCE_EXT") {
            s.source_extension = ext.trim_start_matches('.').to_string();
        }
        if let Ok(limit) = std::env::var("PLUGIN_BODY_LIMIT") {
            s.body_limit = limit
                .parse()
                .map_err(|_| ConfigError::Validation(format!("invalid body limit: {}", limit)))?;
        }
        Ok(s)
    }
}
