//! Container builder
//!
//! Sources are applied in the order they were added, later sources
//! replacing earlier entries with the same identifier. Definitions added in
//! code through [`ContainerBuilder::add_definition`] are applied after every
//! source.
//!
//! Parsed sources are kept in the definition cache under
//! `definitions:<path>` and read back from there on the next build. The
//! default cache is process-local memory.

use crate::cache::provider::TypedCache;
use crate::constants::DEFINITIONS_CACHE_PREFIX;
use crate::di::container::{Container, FactoryArgs, FactoryFn, ServiceRef};
use crate::di::definitions::{Definition, DefinitionMap, parse_definitions};
use crate::di::proxy::ProxyManifest;
use crate::error_ext::ErrorContext;
use diplug_domain::error::{Error, Result};
use diplug_domain::ports::cache::{CacheEntryConfig, CacheProvider};
use diplug_domain::value_objects::DefinitionSource;
use diplug_providers::cache::MemoryCacheProvider;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Collects definitions and factories, then builds a [`Container`]
pub struct ContainerBuilder {
    sources: Vec<DefinitionSource>,
    definitions: Vec<(String, Definition)>,
    factories: HashMap<String, FactoryFn>,
    definition_cache: Arc<dyn CacheProvider>,
    proxy_dir: Option<PathBuf>,
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder {
    /// Empty builder with an in-memory definition cache
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            definitions: Vec::new(),
            factories: HashMap::new(),
            definition_cache: Arc::new(MemoryCacheProvider::new()),
            proxy_dir: None,
        }
    }

    /// Append a definition source
    pub fn add_definitions(&mut self, source: DefinitionSource) -> &mut Self {
        self.sources.push(source);
        self
    }

    /// Add a single definition, applied after every source
    pub fn add_definition<S: Into<String>>(&mut self, id: S, definition: Definition) -> &mut Self {
        self.definitions.push((id.into(), definition));
        self
    }

    /// Register a factory under `name`
    pub fn register_factory<S, F, T>(&mut self, name: S, factory: F) -> &mut Self
    where
        S: Into<String>,
        F: Fn(&FactoryArgs) -> Result<T> + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        let factory: FactoryFn = Arc::new(move |args: &FactoryArgs| {
            factory(args).map(|service| Arc::new(service) as ServiceRef)
        });
        self.register_factory_fn(name, factory)
    }

    /// Register an already type-erased factory under `name`
    pub fn register_factory_fn<S: Into<String>>(&mut self, name: S, factory: FactoryFn) -> &mut Self {
        self.factories.insert(name.into(), factory);
        self
    }

    /// Cache parsed definition sources in `cache`
    pub fn set_definition_cache(&mut self, cache: Arc<dyn CacheProvider>) -> &mut Self {
        self.definition_cache = cache;
        self
    }

    /// Write lazy service manifests to `dir` during the build
    pub fn write_proxies_to_file<P: Into<PathBuf>>(&mut self, dir: P) -> &mut Self {
        self.proxy_dir = Some(dir.into());
        self
    }

    /// Sources added so far, in application order
    pub fn sources(&self) -> &[DefinitionSource] {
        &self.sources
    }

    /// Proxy manifest directory, when set
    pub fn proxy_dir(&self) -> Option<&Path> {
        self.proxy_dir.as_deref()
    }

    /// Whether a factory is registered under `name`
    pub fn has_factory(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Definition cache in use
    pub fn definition_cache(&self) -> Arc<dyn CacheProvider> {
        Arc::clone(&self.definition_cache)
    }

    /// Build the container
    ///
    /// Fails when a source is missing or malformed, or when an entry names a
    /// factory that was never registered.
    pub async fn build(self) -> Result<Container> {
        let cache = TypedCache::new(Arc::clone(&self.definition_cache));
        let mut merged: HashMap<String, Definition> = HashMap::new();

        for source in &self.sources {
            let definitions = load_source(&cache, source).await?;
            debug!(source = %source, entries = definitions.len(), "Definitions applied");
            merged.extend(definitions);
        }
        merged.extend(self.definitions);

        for (id, definition) in &merged {
            if let Definition::Factory(factory) = definition {
                if !self.factories.contains_key(&factory.factory) {
                    return Err(Error::resolution(
                        id,
                        format!("no factory registered under '{}'", factory.factory),
                    ));
                }
            }
        }

        if let Some(dir) = &self.proxy_dir {
            write_proxy_manifests(dir, &merged).await?;
        }

        info!(
            entries = merged.len(),
            factories = self.factories.len(),
            "Container built"
        );
        Ok(Container::new(merged, self.factories))
    }
}

async fn load_source(cache: &TypedCache, source: &DefinitionSource) -> Result<DefinitionMap> {
    let path = source.path();
    let key = format!("{DEFINITIONS_CACHE_PREFIX}{}", path.display());

    if let Some(definitions) = cache.get::<DefinitionMap>(&key).await? {
        debug!(path = %path.display(), "Definitions read from cache");
        return Ok(definitions);
    }

    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::definition(
                path.display().to_string(),
                "definition file not found",
            ));
        }
        Err(e) => {
            return Err(Error::definition_with_source(
                path.display().to_string(),
                "failed to read definition file",
                e,
            ));
        }
    };

    let definitions = parse_definitions(path, &content)?;
    cache
        .set(&key, &definitions, CacheEntryConfig::default())
        .await?;
    Ok(definitions)
}

async fn write_proxy_manifests(dir: &Path, definitions: &HashMap<String, Definition>) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .io_context(format!("Failed to create proxy directory {}", dir.display()))?;

    let mut written = 0usize;
    for (id, definition) in definitions {
        if let Definition::Factory(factory) = definition {
            if factory.lazy && ProxyManifest::for_service(id, factory)?.write_if_changed(dir).await? {
                written += 1;
            }
        }
    }
    debug!(dir = %dir.display(), written, "Proxy manifests up to date");
    Ok(())
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("sources", &self.sources)
            .field("definitions", &self.definitions.len())
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .field("proxy_dir", &self.proxy_dir)
            .finish()
    }
}
