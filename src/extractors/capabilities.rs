//! Extract caller capabilities from the request (`X-Capabilities` header).

use crate::permission::Capabilities;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Header carrying a comma-separated capability list, set by the host's session layer.
pub const CAPABILITIES_HEADER: &str = "X-Capabilities";

/// Extractor for the caller's capabilities. A missing or unreadable header yields none.
#[derive(Clone, Debug, Default)]
pub struct Caller(pub Capabilities);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let caps = parts
            .headers
            .get(CAPABILITIES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(Capabilities::parse)
            .unwrap_or_default();
        Ok(Caller(caps))
    }
}
