//! Shared application state for resource routes.

use crate::lifecycle::Plugin;
use crate::service::ResourceService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub plugin: Arc<Plugin>,
}

impl AppState {
    pub fn new(plugin: Arc<Plugin>) -> Self {
        AppState { plugin }
    }

    pub fn service_by_endpoint(&self, endpoint: &str) -> Option<&Arc<ResourceService>> {
        self.plugin.service(endpoint)
    }
}
