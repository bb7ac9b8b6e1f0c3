//! Plugin lifecycle: enable, disable and uninstall dispatched to every resource.

use crate::config::{ResolvedPlugin, Settings};
use crate::error::{AppError, ConfigError};
use crate::locator::SymbolLocator;
use crate::model::ResourceDefinition;
use crate::schema::SchemaCache;
use crate::service::ResourceService;
use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    Enable,
    Disable,
    Uninstall,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LifecycleEvent::Enable => "enable",
            LifecycleEvent::Disable => "disable",
            LifecycleEvent::Uninstall => "uninstall",
        })
    }
}

/// What a resource does in response to an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Create the table, then insert the default rows into it if it is empty.
    Install,
    DropTable,
}

/// Events a resource handles, with the action each one triggers.
pub fn handled_events(def: &ResourceDefinition) -> Vec<(LifecycleEvent, LifecycleAction)> {
    let mut out = vec![(LifecycleEvent::Enable, LifecycleAction::Install)];
    if def.drop_on_disable {
        out.push((LifecycleEvent::Disable, LifecycleAction::DropTable));
    }
    if def.drop_on_uninstall {
        out.push((LifecycleEvent::Uninstall, LifecycleAction::DropTable));
    }
    out
}

/// A resolved plugin bound to storage: its API root, one service per exposed resource
/// and a symbol locator seeded with the plugin's namespace roots.
pub struct Plugin {
    api_root: String,
    services: Vec<Arc<ResourceService>>,
    locator: SymbolLocator,
}

impl Plugin {
    pub fn new(
        resolved: &ResolvedPlugin,
        storage: Arc<dyn Storage>,
        cache: &SchemaCache,
        settings: &Settings,
    ) -> Result<Self, ConfigError> {
        let services = resolved
            .resources
            .iter()
            .map(|def| ResourceService::new(def.clone(), storage.clone(), cache, settings).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        let locator = SymbolLocator::new().with_extension(&settings.source_extension);
        for (namespace, roots) in &resolved.namespaces {
            locator.register_roots(namespace, roots);
        }
        Ok(Plugin {
            api_root: resolved.api_root(),
            services,
            locator,
        })
    }

    pub fn locator(&self) -> &SymbolLocator {
        &self.locator
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Services in registration order.
    pub fn services(&self) -> &[Arc<ResourceService>] {
        &self.services
    }

    pub fn service(&self, endpoint: &str) -> Option<&Arc<ResourceService>> {
        self.services.iter().find(|s| s.endpoint() == endpoint)
    }

    /// Dispatch `event` to every resource that handles it, in registration order.
    /// Stops at the first failure.
    pub async fn fire(&self, event: LifecycleEvent) -> Result<(), AppError> {
        tracing::info!(api = %self.api_root, %event, "lifecycle event");
        for service in &self.services {
            let action = handled_events(service.definition())
                .into_iter()
                .find(|(e, _)| *e == event)
                .map(|(_, a)| a);
            match action {
                Some(LifecycleAction::Install) => install(service).await?,
                Some(LifecycleAction::DropTable) => {
                    service.storage().execute_ddl(&service.drop_statement()).await?;
                    tracing::debug!(table = %service.table().name, "table dropped");
                }
                None => {
                    tracing::debug!(resource = %service.definition().name, %event, "event not handled");
                }
            }
        }
        Ok(())
    }
}

async fn install(service: &ResourceService) -> Result<(), AppError> {
    service.storage().execute_ddl(&service.table_definition()).await?;
    if !service.storage().select_all(service.table()).await?.is_empty() {
        tracing::debug!(table = %service.table().name, "table already populated");
        return Ok(());
    }
    for row in &service.definition().default_items {
        service.create(row).await?;
    }
    tracing::debug!(
        table = %service.table().name,
        defaults = service.definition().default_items.len(),
        "table installed"
    );
    Ok(())
}
