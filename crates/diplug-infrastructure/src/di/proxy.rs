//! Lazy service proxies
//!
//! A service declared with `lazy = true` resolves to a [`LazyService`]
//! standing in for it; the factory runs the first time the real service is
//! asked for. When the builder is given a proxy directory, each lazy service
//! is also described by a `<id>.proxy.json` manifest there, and unchanged
//! manifests are left alone on later builds.

use crate::constants::PROXY_MANIFEST_SUFFIX;
use crate::di::container::{ContainerInner, ResolutionContext, ServiceRef, downcast_service};
use crate::di::definitions::FactoryDefinition;
use crate::error_ext::ErrorContext;
use diplug_domain::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, Weak};
use tracing::debug;

thread_local! {
    /// Lazy services being built on this thread, innermost last
    static FORCING: RefCell<Vec<(usize, String)>> = const { RefCell::new(Vec::new()) };
}

/// Marks a lazy service as being built on the current thread until dropped
struct ForcingGuard;

impl ForcingGuard {
    fn enter(service: &LazyService) -> Result<Self> {
        let key = std::ptr::from_ref(service) as usize;
        FORCING.with_borrow_mut(|stack| {
            if let Some(start) = stack.iter().position(|(current, _)| *current == key) {
                let mut path: Vec<String> = stack[start..].iter().map(|(_, id)| id.clone()).collect();
                path.push(service.id.clone());
                return Err(Error::CircularDependency { path });
            }
            stack.push((key, service.id.clone()));
            Ok(Self)
        })
    }
}

impl Drop for ForcingGuard {
    fn drop(&mut self) {
        FORCING.with_borrow_mut(|stack| {
            stack.pop();
        });
    }
}

/// Stand-in for a service built on first access
pub struct LazyService {
    id: String,
    definition: FactoryDefinition,
    container: Weak<ContainerInner>,
    instance: OnceLock<ServiceRef>,
}

impl LazyService {
    pub(crate) fn new(id: &str, definition: FactoryDefinition, container: Weak<ContainerInner>) -> Self {
        Self {
            id: id.to_string(),
            definition,
            container,
            instance: OnceLock::new(),
        }
    }

    /// Identifier of the proxied service
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Factory that builds the service
    pub fn factory(&self) -> &str {
        &self.definition.factory
    }

    /// Whether the real service has been built
    pub fn is_initialized(&self) -> bool {
        self.instance.get().is_some()
    }

    /// The real service, built on first call
    ///
    /// A factory that needs its own service while it runs fails with
    /// [`Error::CircularDependency`]. Threads racing on the first call may
    /// each run the factory; the first instance stored is the one every
    /// caller gets.
    pub fn instance(&self) -> Result<ServiceRef> {
        if let Some(instance) = self.instance.get() {
            return Ok(Arc::clone(instance));
        }

        let container = self.container.upgrade().ok_or_else(|| {
            Error::resolution(&self.id, "the container owning this lazy service was dropped")
        })?;

        let _forcing = ForcingGuard::enter(self)?;
        let mut ctx = ResolutionContext::new();
        ctx.enter(&self.id)?;
        debug!(id = %self.id, factory = %self.definition.factory, "Initializing lazy service");
        let built = container.build_service(&self.id, &self.definition, &mut ctx)?;

        Ok(Arc::clone(self.instance.get_or_init(|| built)))
    }

    /// The real service as a `T`
    pub fn get<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        downcast_service(&self.id, self.instance()?)
    }
}

impl fmt::Debug for LazyService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyService")
            .field("id", &self.id)
            .field("factory", &self.definition.factory)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// On-disk description of a lazy service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyManifest {
    /// Service identifier
    pub id: String,
    /// Factory building the service
    pub factory: String,
    /// SHA-256 of the declared arguments
    pub fingerprint: String,
}

impl ProxyManifest {
    /// Manifest for the lazy service `id`
    pub fn for_service(id: &str, definition: &FactoryDefinition) -> Result<Self> {
        let args = serde_json::to_vec(&definition.args)?;
        Ok(Self {
            id: id.to_string(),
            factory: definition.factory.clone(),
            fingerprint: hex::encode(Sha256::digest(&args)),
        })
    }

    /// Manifest file name for `id`
    ///
    /// Characters outside `[A-Za-z0-9._-]` are replaced with `_`.
    pub fn file_name(id: &str) -> String {
        let safe: String = id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{safe}{PROXY_MANIFEST_SUFFIX}")
    }

    /// Path of this manifest under `dir`
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(Self::file_name(&self.id))
    }

    /// Write the manifest unless an identical one is already there
    ///
    /// Returns whether the file was written.
    pub async fn write_if_changed(&self, dir: &Path) -> Result<bool> {
        let path = self.path_in(dir);
        if let Ok(existing) = tokio::fs::read(&path).await {
            if serde_json::from_slice::<ProxyManifest>(&existing).is_ok_and(|m| &m == self) {
                debug!(id = %self.id, "Reusing proxy manifest");
                return Ok(false);
            }
        }

        let content = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(&path, content)
            .await
            .io_context(format!("Failed to write proxy manifest {}", path.display()))?;
        debug!(id = %self.id, path = %path.display(), "Proxy manifest written");
        Ok(true)
    }
}
