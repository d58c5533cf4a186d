//! Per-request controller helper

use crate::di::container::{Container, Injectable, ServiceRef};
use diplug_domain::error::Result;
use std::any::Any;
use std::sync::Arc;
use tracing::trace;

/// Gives request handlers access to the container
#[derive(Debug, Clone)]
pub struct ControllerHelper {
    container: Container,
}

impl ControllerHelper {
    /// Helper over `container`
    pub fn new(container: Container) -> Self {
        Self { container }
    }

    /// Inject a freshly created request handler
    ///
    /// Called once per handler instance, before it handles the request.
    pub fn init(&self, controller: &mut dyn Injectable) -> Result<()> {
        trace!("Injecting request handler");
        self.container.inject_on(controller)
    }

    /// Resolve `id`
    pub fn get(&self, id: &str) -> Result<ServiceRef> {
        self.container.get(id)
    }

    /// Resolve `id` as a `T`
    pub fn get_typed<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
        self.container.get_typed(id)
    }

    /// The container
    pub fn container(&self) -> &Container {
        &self.container
    }
}
