//! Container handle
//!
//! What bootstrap hands back to the host: the built container together with
//! the controller helper request handling uses. One handle exists per
//! process and it is never mutated after construction.

use crate::di::container::{Container, Injectable, ServiceRef};
use crate::lifecycle::controller::ControllerHelper;
use diplug_domain::error::Result;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::sync::Arc;

/// Built container plus its controller helper
#[derive(Debug, Clone)]
pub struct ContainerHandle {
    container: Container,
    controller: ControllerHelper,
}

impl ContainerHandle {
    /// Wrap a built container
    pub fn new(container: Container) -> Self {
        let controller = ControllerHelper::new(container.clone());
        Self {
            container,
            controller,
        }
    }

    /// The container
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Helper injecting request handlers
    pub fn controller(&self) -> &ControllerHelper {
        &self.controller
    }

    /// Resolve `id`
    pub fn get(&self, id: &str) -> Result<ServiceRef> {
        self.container.get(id)
    }

    /// Resolve `id` as a `T`
    pub fn get_typed<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
        self.container.get_typed(id)
    }

    /// Resolve a value entry into `T`
    pub fn parameter<T: DeserializeOwned>(&self, id: &str) -> Result<T> {
        self.container.parameter(id)
    }

    /// Whether `id` is defined
    pub fn has(&self, id: &str) -> bool {
        self.container.has(id)
    }

    /// Let `target` pull its dependencies
    pub fn inject_on(&self, target: &mut dyn Injectable) -> Result<()> {
        self.container.inject_on(target)
    }
}
