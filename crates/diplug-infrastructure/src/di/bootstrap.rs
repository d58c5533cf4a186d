//! Container Bootstrap
//!
//! Composition root: turns an installation layout, an environment and the
//! plugin configuration into the one container of the process.
//!
//! ```text
//! PathResolver → collect() → build_cache() → ContainerBuilder
//!                                                  │
//!                          listeners.before_build ─┤
//!                                                  ▼
//!                   listeners.container_ready ← ContainerHandle
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut bootstrap = Bootstrap::new(BootstrapOptions::from_env());
//! bootstrap.add_listener(Arc::new(MyListener));
//! let handle = bootstrap.bootstrap().await?;
//! let mailer = handle.get_typed::<Mailer>("mailer")?;
//! ```

use crate::cache::selector::build_cache;
use crate::config::{ConfigLoader, PluginConfig};
use crate::di::aggregator::collect;
use crate::di::builder::ContainerBuilder;
use crate::di::container::{FactoryArgs, FactoryFn, ServiceRef};
use crate::di::handle::ContainerHandle;
use crate::paths::{InstallLayout, PathResolver};
use diplug_domain::error::{Error, Result};
use diplug_domain::ports::cache::CacheProvider;
use diplug_domain::value_objects::{DefinitionRole, Environment, FileRole};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Hooks around the container build
///
/// Listeners run synchronously in registration order. An error from any of
/// them aborts the bootstrap.
pub trait ContainerListener: Send + Sync {
    /// Name used in errors and logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Adjust the builder before the container is built
    fn before_build(&self, _builder: &mut ContainerBuilder) -> Result<()> {
        Ok(())
    }

    /// Observe the finished handle
    fn container_ready(&self, _handle: &ContainerHandle) -> Result<()> {
        Ok(())
    }
}

/// Inputs of a bootstrap
#[derive(Clone)]
pub struct BootstrapOptions {
    layout: InstallLayout,
    environment: Environment,
    config: Option<PluginConfig>,
    host_cache: Option<Arc<dyn CacheProvider>>,
    factories: HashMap<String, FactoryFn>,
}

impl BootstrapOptions {
    /// Options for `layout` in `environment`, reading the plugin configuration
    /// from the runtime directory
    pub fn new(layout: InstallLayout, environment: Environment) -> Self {
        Self {
            layout,
            environment,
            config: None,
            host_cache: None,
            factories: HashMap::new(),
        }
    }

    /// Layout and environment taken from the process environment
    pub fn from_env() -> Self {
        Self::new(InstallLayout::from_env(), Environment::from_env())
    }

    /// Use `config` instead of loading `config.toml`
    #[must_use]
    pub fn with_config(mut self, config: PluginConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Read and store the plugin configuration through the host's cache
    ///
    /// A configuration the host already cached wins over `config.toml`.
    /// Ignored when [`with_config`](Self::with_config) supplies one.
    #[must_use]
    pub fn with_host_cache(mut self, cache: Arc<dyn CacheProvider>) -> Self {
        self.host_cache = Some(cache);
        self
    }

    /// Register a factory on the builder
    #[must_use]
    pub fn with_factory<S, F, T>(mut self, name: S, factory: F) -> Self
    where
        S: Into<String>,
        F: Fn(&FactoryArgs) -> Result<T> + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        let factory: FactoryFn = Arc::new(move |args: &FactoryArgs| {
            factory(args).map(|service| Arc::new(service) as ServiceRef)
        });
        self.factories.insert(name.into(), factory);
        self
    }

    /// Installation layout
    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    /// Environment
    pub fn environment(&self) -> &Environment {
        &self.environment
    }
}

impl fmt::Debug for BootstrapOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapOptions")
            .field("layout", &self.layout)
            .field("environment", &self.environment)
            .field("config", &self.config)
            .field("host_cache", &self.host_cache)
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builds the container once
pub struct Bootstrap {
    options: BootstrapOptions,
    listeners: Vec<Arc<dyn ContainerListener>>,
    handle: OnceCell<Arc<ContainerHandle>>,
}

impl Bootstrap {
    /// Bootstrap with `options` and no listeners
    pub fn new(options: BootstrapOptions) -> Self {
        Self {
            options,
            listeners: Vec::new(),
            handle: OnceCell::new(),
        }
    }

    /// Register a listener
    pub fn add_listener(&mut self, listener: Arc<dyn ContainerListener>) -> &mut Self {
        self.listeners.push(listener);
        self
    }

    /// Options this bootstrap runs with
    pub fn options(&self) -> &BootstrapOptions {
        &self.options
    }

    /// Handle, when the container has been built
    pub fn handle(&self) -> Option<Arc<ContainerHandle>> {
        self.handle.get().cloned()
    }

    /// Build the container, or return the one already built
    ///
    /// Concurrent callers wait for a single build. A failed build leaves
    /// nothing behind; the host is expected to abort rather than call again.
    pub async fn bootstrap(&self) -> Result<Arc<ContainerHandle>> {
        self.handle
            .get_or_try_init(|| self.build())
            .await
            .map(Arc::clone)
    }

    async fn build(&self) -> Result<Arc<ContainerHandle>> {
        let environment = &self.options.environment;
        let resolver = PathResolver::new(self.options.layout.clone());
        info!(
            environment = %environment,
            config_dir = %resolver.config_dir().display(),
            "Bootstrapping container"
        );

        let config = match (&self.options.config, &self.options.host_cache) {
            (Some(config), _) => config.clone(),
            (None, Some(host_cache)) => {
                ConfigLoader::for_resolver(&resolver)
                    .load_cached(host_cache.as_ref())
                    .await?
            }
            (None, None) => ConfigLoader::for_resolver(&resolver).load()?,
        };

        let mut builder = ContainerBuilder::new();

        if config.use_definition_files {
            let tag = environment.tag();
            let base = resolver.definition_source(DefinitionRole::Container, None);
            let overlay = tag.map(|t| resolver.definition_source(DefinitionRole::Container, Some(t)));
            let parameters = resolver.definition_source(DefinitionRole::Parameters, None);

            for source in collect(&base, overlay.as_ref(), &parameters) {
                debug!(source = %source, "Adding definition source");
                builder.add_definitions(source);
            }

            let cache = build_cache(&config.cache, environment, resolver.layout()).await?;
            builder.set_definition_cache(cache);
        } else {
            debug!("Definition files disabled");
        }

        for (name, factory) in &self.options.factories {
            builder.register_factory_fn(name.clone(), Arc::clone(factory));
        }

        if config.cache_proxies {
            builder.write_proxies_to_file(resolver.resolve(FileRole::ProxyDir, None));
        }

        for listener in &self.listeners {
            debug!(listener = listener.name(), "Running before_build listener");
            listener
                .before_build(&mut builder)
                .map_err(|e| listener_error(listener.as_ref(), e))?;
        }

        let container = builder.build().await?;
        let handle = Arc::new(ContainerHandle::new(container));

        for listener in &self.listeners {
            debug!(listener = listener.name(), "Running container_ready listener");
            listener
                .container_ready(&handle)
                .map_err(|e| listener_error(listener.as_ref(), e))?;
        }

        info!(
            entries = handle.container().len(),
            "Container ready"
        );
        Ok(handle)
    }
}

fn listener_error(listener: &dyn ContainerListener, error: Error) -> Error {
    match error {
        Error::Listener { .. } => error,
        other => Error::listener(listener.name(), other.to_string()),
    }
}

impl fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bootstrap")
            .field("options", &self.options)
            .field("listeners", &self.listeners.len())
            .field("built", &self.handle.initialized())
            .finish()
    }
}
