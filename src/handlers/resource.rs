//! Resource CRUD handlers: list, create, read, update, delete.
//! Each handler matches the id pattern, resolves the service by endpoint, then checks the
//! caller's capability before touching storage.

use crate::error::AppError;
use crate::extractors::Caller;
use crate::model::RawRow;
use crate::permission::Action;
use crate::response::{created, listing, ok};
use crate::service::ResourceService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::sync::Arc;

fn authorize(
    state: &AppState,
    endpoint: &str,
    caller: &Caller,
    action: Action,
) -> Result<Arc<ResourceService>, AppError> {
    let service = state
        .service_by_endpoint(endpoint)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("no route for {}", endpoint)))?;
    let perms = &service.definition().permissions;
    if !perms.allows(&caller.0, action) {
        tracing::debug!(endpoint, ?action, required = perms.required_for(action), "permission denied");
        return Err(AppError::Forbidden(format!(
            "missing capability '{}'",
            perms.required_for(action)
        )));
    }
    Ok(service)
}

/// Ids are positive integers; anything else matches no route.
fn parse_id(id: &str) -> Result<i64, AppError> {
    match id.parse::<i64>() {
        Ok(n) if n > 0 && id.bytes().all(|b| b.is_ascii_digit()) => Ok(n),
        _ => Err(AppError::NotFound(format!("no route for id {}", id))),
    }
}

fn body_to_row(value: Value) -> Result<RawRow, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

fn missing(service: &ResourceService, id: i64) -> AppError {
    AppError::NotFound(format!("{} {}", service.endpoint(), id))
}

pub async fn list(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    let service = authorize(&state, &endpoint, &caller, Action::List)?;
    let rows = service.list().await?;
    Ok(listing(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
    caller: Caller,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let service = authorize(&state, &endpoint, &caller, Action::Create)?;
    let row = service.create(&body_to_row(body)?).await?;
    Ok(created(row))
}

pub async fn read(
    State(state): State<AppState>,
    Path((endpoint, id)): Path<(String, String)>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let service = authorize(&state, &endpoint, &caller, Action::Get)?;
    let row = service.get(id).await?.ok_or_else(|| missing(&service, id))?;
    Ok(ok(row))
}

pub async fn update(
    State(state): State<AppState>,
    Path((endpoint, id)): Path<(String, String)>,
    caller: Caller,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let service = authorize(&state, &endpoint, &caller, Action::Edit)?;
    let row = service
        .update(id, &body_to_row(body)?)
        .await?
        .ok_or_else(|| missing(&service, id))?;
    Ok(ok(row))
}

/// Responds with the removed record.
pub async fn delete(
    State(state): State<AppState>,
    Path((endpoint, id)): Path<(String, String)>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id)?;
    let service = authorize(&state, &endpoint, &caller, Action::Delete)?;
    let row = service.get(id).await?.ok_or_else(|| missing(&service, id))?;
    if !service.delete(id).await? {
        return Err(missing(&service, id));
    }
    Ok(ok(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(parse_id("0").is_err());
        assert!(parse_id("-3").is_err());
        assert!(parse_id("+3").is_err());
        assert!(parse_id("abc").is_err());
    }
}
