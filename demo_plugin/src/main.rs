//! Demo host: loads a plugin from a config directory, enables it and serves its resources.
//!
//! Run from repo root: `cargo run -p demo-plugin`
//! Storage is in-memory unless DATABASE_URL is set.

use plugin_framework::{
    common_routes, load_from_dir, resolve, resource_routes, LifecycleEvent, MemoryStorage, PgStorage, Plugin,
    SchemaCache, Settings, Storage,
};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("plugin_framework=info,demo_plugin=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let config_dir = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "demo_plugin/config".into());
    let config = load_from_dir(&config_dir).await?;
    let resolved = resolve(&config)?;

    let storage: Arc<dyn Storage> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(&url)
                .await?;
            Arc::new(PgStorage::new(pool))
        }
        Err(_) => Arc::new(MemoryStorage::with_dialect(settings.dialect)),
    };

    let cache = SchemaCache::new();
    let plugin = Arc::new(Plugin::new(&resolved, storage, &cache, &settings)?);
    plugin.fire(LifecycleEvent::Enable).await?;

    if let Ok(extra) = std::env::var("SOURCE_ROOT") {
        plugin.locator().register_root("Demo\\Shop", &extra);
    }
    match plugin.locator().resolve("Demo\\Shop\\Models\\Widget") {
        Some(path) => tracing::info!(path = %path.display(), "widget source located"),
        None => tracing::warn!("widget source not found under the configured namespace roots"),
    }

    let app = Router::new()
        .merge(common_routes())
        .merge(resource_routes(plugin.clone(), settings.body_limit));

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into());
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("serving /{} on http://{}", plugin.api_root(), listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
