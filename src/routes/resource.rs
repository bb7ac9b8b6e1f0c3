//! Resource CRUD routes nested under the plugin's API root.
//! Paths are parameterized; handlers resolve the resource by endpoint.

use crate::handlers::resource::{create, delete as delete_handler, list, read, update};
use crate::lifecycle::Plugin;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// `GET|POST /{root}/:endpoint` and `GET|POST|PUT|PATCH|DELETE /{root}/:endpoint/:id`.
pub fn resource_routes(plugin: Arc<Plugin>, body_limit: usize) -> Router {
    let root = format!("/{}", plugin.api_root().trim_matches('/'));
    for service in plugin.services() {
        tracing::debug!(route = %format!("{}/{}", root, service.endpoint()), "resource route registered");
    }
    let routes = Router::new()
        .route("/:endpoint", get(list).post(create))
        .route(
            "/:endpoint/:id",
            get(read)
                .post(update)
                .put(update)
                .patch(update)
                .delete(delete_handler),
        )
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(AppState::new(plugin));
    Router::new().nest(&root, routes)
}
