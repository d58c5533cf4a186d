//! Container
//!
//! Every entry is resolved at most once and memoized for the lifetime of the
//! container. Resolution carries a stack of the identifiers being resolved,
//! so a definition that ends up requiring itself fails with
//! [`Error::CircularDependency`] instead of recursing.

use crate::constants::MAX_RESOLUTION_DEPTH;
use crate::di::definitions::{Definition, FactoryDefinition};
use crate::di::proxy::LazyService;
use dashmap::DashMap;
use diplug_domain::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::{Any, type_name};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::trace;

/// A resolved entry
pub type ServiceRef = Arc<dyn Any + Send + Sync>;

/// A service factory registered on the builder
pub type FactoryFn = Arc<dyn Fn(&FactoryArgs) -> Result<ServiceRef> + Send + Sync>;

/// Receives entries from the container
///
/// Request handlers implement this to pull the services they need; the
/// controller helper calls it once per handler instance.
pub trait Injectable {
    /// Fetch dependencies from `container`
    fn inject(&mut self, container: &Container) -> Result<()>;
}

/// Identifiers currently being resolved, outermost first
#[derive(Debug, Default)]
pub struct ResolutionContext {
    stack: Vec<String>,
}

impl ResolutionContext {
    /// Empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `id`, failing when it is already being resolved
    pub fn enter(&mut self, id: &str) -> Result<()> {
        if self.stack.iter().any(|current| current == id) {
            let mut path = self.stack.clone();
            path.push(id.to_string());
            return Err(Error::CircularDependency { path });
        }
        if self.stack.len() >= MAX_RESOLUTION_DEPTH {
            return Err(Error::resolution(
                id,
                format!("resolution deeper than {MAX_RESOLUTION_DEPTH} entries"),
            ));
        }
        self.stack.push(id.to_string());
        Ok(())
    }

    /// Pop the innermost identifier
    pub fn exit(&mut self) {
        self.stack.pop();
    }

    /// Current resolution path
    pub fn path(&self) -> &[String] {
        &self.stack
    }
}

/// Resolved arguments handed to a factory
pub struct FactoryArgs {
    service: String,
    args: BTreeMap<String, ServiceRef>,
}

impl FactoryArgs {
    pub(crate) fn new(service: &str, args: BTreeMap<String, ServiceRef>) -> Self {
        Self {
            service: service.to_string(),
            args,
        }
    }

    /// Identifier of the service being built
    pub fn service_id(&self) -> &str {
        &self.service
    }

    /// Whether the argument was declared
    pub fn contains(&self, name: &str) -> bool {
        self.args.contains_key(name)
    }

    /// Argument as resolved
    pub fn get(&self, name: &str) -> Result<ServiceRef> {
        self.args.get(name).cloned().ok_or_else(|| {
            Error::resolution(&self.service, format!("missing factory argument '{name}'"))
        })
    }

    /// Argument downcast to `T`
    pub fn get_typed<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        downcast_service(&format!("{}.{name}", self.service), self.get(name)?)
    }

    /// Value argument deserialized into `T`
    pub fn value<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self.get_typed::<Value>(name)?;
        T::deserialize(value.as_ref()).map_err(|e| {
            Error::resolution(&self.service, format!("argument '{name}' has the wrong shape: {e}"))
        })
    }
}

impl fmt::Debug for FactoryArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryArgs")
            .field("service", &self.service)
            .field("args", &self.args.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Downcast a resolved entry, forcing lazy services when needed
pub(crate) fn downcast_service<T: Any + Send + Sync>(id: &str, service: ServiceRef) -> Result<Arc<T>> {
    let service = match service.downcast::<T>() {
        Ok(typed) => return Ok(typed),
        Err(service) => service,
    };
    match service.downcast::<LazyService>() {
        Ok(lazy) => lazy.get::<T>(),
        Err(_) => Err(Error::TypeMismatch {
            id: id.to_string(),
            expected: type_name::<T>(),
        }),
    }
}

pub(crate) struct ContainerInner {
    definitions: HashMap<String, Definition>,
    factories: HashMap<String, FactoryFn>,
    singletons: DashMap<String, ServiceRef>,
    this: Weak<ContainerInner>,
}

impl ContainerInner {
    fn resolve(&self, id: &str, ctx: &mut ResolutionContext) -> Result<ServiceRef> {
        if let Some(existing) = self.singletons.get(id).map(|entry| Arc::clone(entry.value())) {
            return Ok(existing);
        }

        let definition = self
            .definitions
            .get(id)
            .ok_or_else(|| Error::not_found(id))?;

        ctx.enter(id)?;
        trace!(id, depth = ctx.path().len(), "Resolving entry");
        let result = self.evaluate(id, definition, ctx);
        ctx.exit();
        let value = result?;

        // A concurrent resolution may have won; keep the first instance
        Ok(Arc::clone(
            self.singletons.entry(id.to_string()).or_insert(value).value(),
        ))
    }

    fn evaluate(
        &self,
        id: &str,
        definition: &Definition,
        ctx: &mut ResolutionContext,
    ) -> Result<ServiceRef> {
        match definition {
            Definition::Value(value) => Ok(Arc::new(value.clone())),
            Definition::Reference(target) => self.resolve(target, ctx),
            Definition::Interpolated(template) => {
                Ok(Arc::new(Value::String(self.interpolate(id, template, ctx)?)))
            }
            Definition::Environment { variable, default } => {
                let value = match std::env::var(variable) {
                    Ok(value) => Value::String(value),
                    Err(_) => default.clone().ok_or_else(|| {
                        Error::resolution(
                            id,
                            format!("environment variable '{variable}' is not set"),
                        )
                    })?,
                };
                Ok(Arc::new(value))
            }
            Definition::Factory(factory) if factory.lazy => Ok(Arc::new(LazyService::new(
                id,
                factory.clone(),
                Weak::clone(&self.this),
            ))),
            Definition::Factory(factory) => self.build_service(id, factory, ctx),
        }
    }

    /// Call the factory behind `definition` with its arguments resolved
    pub(crate) fn build_service(
        &self,
        id: &str,
        definition: &FactoryDefinition,
        ctx: &mut ResolutionContext,
    ) -> Result<ServiceRef> {
        let factory = self.factories.get(&definition.factory).ok_or_else(|| {
            Error::resolution(
                id,
                format!("no factory registered under '{}'", definition.factory),
            )
        })?;

        let mut args = BTreeMap::new();
        for (name, argument) in &definition.args {
            if matches!(argument, Definition::Factory(_)) {
                return Err(Error::resolution(
                    id,
                    format!("argument '{name}' cannot declare a service"),
                ));
            }
            args.insert(name.clone(), self.evaluate(id, argument, ctx)?);
        }

        factory(&FactoryArgs::new(id, args))
    }

    fn interpolate(&self, id: &str, template: &str, ctx: &mut ResolutionContext) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match after.find('}') {
                Some(end) if is_placeholder(&after[..end]) => {
                    out.push_str(&self.scalar_string(id, &after[..end], ctx)?);
                    rest = &after[end + 1..];
                }
                _ => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        Ok(out)
    }

    fn scalar_string(&self, id: &str, name: &str, ctx: &mut ResolutionContext) -> Result<String> {
        let resolved = self.resolve(name, ctx)?;
        let Some(value) = resolved.downcast_ref::<Value>() else {
            return Err(Error::resolution(
                id,
                format!("placeholder '{name}' is a service, not a value"),
            ));
        };
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Null => Ok(String::new()),
            Value::Array(_) | Value::Object(_) => Err(Error::resolution(
                id,
                format!("placeholder '{name}' is not a scalar value"),
            )),
        }
    }
}

fn is_placeholder(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c.is_whitespace() || c == '{')
}

/// Built container
///
/// Cloning is cheap and every clone shares the same singletons.
///
/// Resolution is not single-flight: when several threads ask for an entry
/// that has not been built yet, its factory may run once per thread. Only
/// the first instance is kept and every caller receives that one, so
/// factories should not have side effects that must happen exactly once.
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    pub(crate) fn new(
        definitions: HashMap<String, Definition>,
        factories: HashMap<String, FactoryFn>,
    ) -> Self {
        let inner = Arc::new_cyclic(|this| ContainerInner {
            definitions,
            factories,
            singletons: DashMap::new(),
            this: Weak::clone(this),
        });
        Self { inner }
    }

    /// Resolve `id`
    pub fn get(&self, id: &str) -> Result<ServiceRef> {
        self.inner.resolve(id, &mut ResolutionContext::new())
    }

    /// Resolve `id` as a `T`
    ///
    /// Lazy services are built on the way when `T` is not [`LazyService`].
    pub fn get_typed<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
        downcast_service(id, self.get(id)?)
    }

    /// Resolve a value entry and deserialize it into `T`
    pub fn parameter<T: DeserializeOwned>(&self, id: &str) -> Result<T> {
        let value = self.get_typed::<Value>(id)?;
        T::deserialize(value.as_ref()).map_err(|e| {
            Error::resolution(id, format!("cannot read parameter as {}: {e}", type_name::<T>()))
        })
    }

    /// Whether an entry is defined under `id`
    pub fn has(&self, id: &str) -> bool {
        self.inner.definitions.contains_key(id)
    }

    /// Defined identifiers, sorted
    pub fn entry_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.inner.definitions.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of defined entries
    pub fn len(&self) -> usize {
        self.inner.definitions.len()
    }

    /// Whether no entry is defined
    pub fn is_empty(&self) -> bool {
        self.inner.definitions.is_empty()
    }

    /// Number of entries resolved so far
    pub fn resolved_count(&self) -> usize {
        self.inner.singletons.len()
    }

    /// Let `target` pull its dependencies
    pub fn inject_on(&self, target: &mut dyn Injectable) -> Result<()> {
        target.inject(self)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("entries", &self.inner.definitions.len())
            .field("resolved", &self.inner.singletons.len())
            .field("factories", &self.inner.factories.len())
            .finish()
    }
}
