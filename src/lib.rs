//! Plugin framework core: declarative resources turned into tables, REST arguments and CRUD routes,
//! plus a symbol locator for namespace-rooted source trees.

pub mod case;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod lifecycle;
pub mod locator;
pub mod model;
pub mod permission;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sql;
pub mod state;
pub mod storage;

pub use config::{load_from_dir, resolve, PluginConfig, ResolvedPlugin, Settings};
pub use error::{AppError, ConfigError, DataIntegrityError};
pub use lifecycle::{LifecycleEvent, Plugin};
pub use locator::SymbolLocator;
pub use model::{base_resource, database_list, ResourceBuilder, ResourceDefinition};
pub use routes::{common_routes, resource_routes};
pub use schema::{derive_schema, DerivedSchema, SchemaCache};
pub use service::ResourceService;
pub use state::AppState;
pub use storage::{MemoryStorage, PgStorage, Storage};
