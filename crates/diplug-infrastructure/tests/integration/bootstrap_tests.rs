//! Bootstrap tests

use crate::support::{Fixture, config_without_proxies};
use diplug_domain::error::{Error, Result};
use diplug_domain::ports::cache::{CacheEntryConfig, CacheProvider};
use diplug_domain::value_objects::Environment;
use diplug_infrastructure::config::PluginConfig;
use diplug_infrastructure::di::{ContainerBuilder, Definition, FactoryArgs, LazyService};
use diplug_infrastructure::{Bootstrap, BootstrapOptions, ContainerHandle, ContainerListener, Installer};
use diplug_providers::cache::MemoryCacheProvider;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct ServiceA {
    x: i64,
}

async fn installed(fixture: &Fixture) {
    Installer::new(fixture.resolver()).install().await.unwrap();
}

fn options(fixture: &Fixture, environment: Environment) -> BootstrapOptions {
    BootstrapOptions::new(fixture.layout.clone(), environment).with_factory(
        "service_a",
        |args: &FactoryArgs| Ok(ServiceA { x: args.value("x")? }),
    )
}

#[tokio::test]
async fn test_end_to_end_resolution() {
    let fixture = Fixture::new();
    installed(&fixture).await;
    fixture.write_config_file("parameters.toml", "X = 1\n");
    fixture.write_config_file(
        "container.toml",
        "A = { factory = \"service_a\", args = { x = { get = \"X\" } } }\n",
    );

    let bootstrap = Bootstrap::new(
        options(&fixture, Environment::untagged()).with_config(config_without_proxies()),
    );
    let handle = bootstrap.bootstrap().await.unwrap();

    assert_eq!(handle.get_typed::<ServiceA>("A").unwrap().x, 1);
    assert_eq!(handle.parameter::<i64>("X").unwrap(), 1);
    assert!(!fixture.config_dir().join("generated").join("A.proxy.json").exists());
}

#[tokio::test]
async fn test_bootstrap_runs_once() {
    let fixture = Fixture::new();
    installed(&fixture).await;

    let bootstrap = Bootstrap::new(
        options(&fixture, Environment::untagged()).with_config(config_without_proxies()),
    );
    assert!(bootstrap.handle().is_none());

    let first = bootstrap.bootstrap().await.unwrap();
    let second = bootstrap.bootstrap().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &bootstrap.handle().unwrap()));
}

#[tokio::test]
async fn test_concurrent_bootstraps_share_one_build() {
    let fixture = Fixture::new();
    installed(&fixture).await;

    let bootstrap = Arc::new(Bootstrap::new(
        options(&fixture, Environment::untagged()).with_config(config_without_proxies()),
    ));
    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let bootstrap = Arc::clone(&bootstrap);
            tokio::spawn(async move { bootstrap.bootstrap().await.unwrap() })
        })
        .collect();

    let mut handles = Vec::new();
    for task in tasks {
        handles.push(task.await.unwrap());
    }
    assert!(handles.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[tokio::test]
async fn test_parameters_override_container_definitions() {
    let fixture = Fixture::new();
    installed(&fixture).await;
    fixture.write_config_file("container.toml", "\"db.host\" = \"localhost\"\n\"db.port\" = 5432\n");
    fixture.write_config_file("parameters.toml", "\"db.host\" = \"db.internal\"\n");

    let bootstrap = Bootstrap::new(
        options(&fixture, Environment::untagged()).with_config(config_without_proxies()),
    );
    let handle = bootstrap.bootstrap().await.unwrap();

    assert_eq!(handle.parameter::<String>("db.host").unwrap(), "db.internal");
    assert_eq!(handle.parameter::<u16>("db.port").unwrap(), 5432);
}

#[tokio::test]
async fn test_environment_overlay_applies_between_base_and_parameters() {
    let fixture = Fixture::new();
    installed(&fixture).await;
    fixture.write_config_file("container.toml", "mode = \"base\"\nlevel = \"base\"\nname = \"base\"\n");
    fixture.write_config_file("staging.container.toml", "mode = \"staging\"\nlevel = \"staging\"\n");
    fixture.write_config_file("parameters.toml", "level = \"local\"\n");

    let bootstrap = Bootstrap::new(
        options(&fixture, Environment::tagged("staging")).with_config(config_without_proxies()),
    );
    let handle = bootstrap.bootstrap().await.unwrap();

    assert_eq!(handle.parameter::<String>("mode").unwrap(), "staging");
    assert_eq!(handle.parameter::<String>("level").unwrap(), "local");
    assert_eq!(handle.parameter::<String>("name").unwrap(), "base");
}

#[tokio::test]
async fn test_overlay_for_another_environment_is_ignored() {
    let fixture = Fixture::new();
    installed(&fixture).await;
    fixture.write_config_file("container.toml", "mode = \"base\"\n");
    fixture.write_config_file("staging.container.toml", "mode = \"staging\"\n");

    let bootstrap = Bootstrap::new(
        options(&fixture, Environment::tagged("production")).with_config(config_without_proxies()),
    );
    let handle = bootstrap.bootstrap().await.unwrap();

    assert_eq!(handle.parameter::<String>("mode").unwrap(), "base");
}

#[tokio::test]
async fn test_missing_installation_fails() {
    let fixture = Fixture::new();

    let bootstrap = Bootstrap::new(
        options(&fixture, Environment::untagged()).with_config(config_without_proxies()),
    );
    let err = bootstrap.bootstrap().await.unwrap_err();

    assert!(matches!(err, Error::Definition { .. }));
    assert!(err.to_string().contains("definition file not found"));
    assert!(bootstrap.handle().is_none());
}

#[tokio::test]
async fn test_definition_files_can_be_disabled() {
    let fixture = Fixture::new();
    let config = PluginConfig {
        use_definition_files: false,
        cache_proxies: false,
        ..PluginConfig::default()
    };

    let mut bootstrap = Bootstrap::new(options(&fixture, Environment::untagged()).with_config(config));
    bootstrap.add_listener(Arc::new(DefineX));
    let handle = bootstrap.bootstrap().await.unwrap();

    assert!(!handle.has("app.name"));
    assert_eq!(handle.parameter::<i64>("x").unwrap(), 7);
}

#[tokio::test]
async fn test_lazy_services_get_proxy_manifests() {
    let fixture = Fixture::new();
    installed(&fixture).await;
    fixture.write_config_file(
        "container.toml",
        "A = { factory = \"service_a\", args = { x = 5 }, lazy = true }\n",
    );

    let config = PluginConfig {
        cache_proxies: true,
        ..PluginConfig::default()
    };
    let bootstrap = Bootstrap::new(options(&fixture, Environment::untagged()).with_config(config));
    let handle = bootstrap.bootstrap().await.unwrap();

    let manifest = fixture.config_dir().join("generated").join("A.proxy.json");
    let content: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(manifest).unwrap()).unwrap();
    assert_eq!(content["id"], "A");
    assert_eq!(content["factory"], "service_a");
    assert_eq!(content["fingerprint"].as_str().unwrap().len(), 64);

    let proxy = handle.get_typed::<LazyService>("A").unwrap();
    assert!(!proxy.is_initialized());
    assert_eq!(handle.get_typed::<ServiceA>("A").unwrap().x, 5);
    assert!(proxy.is_initialized());
}

#[tokio::test]
#[serial_test::serial]
async fn test_configuration_is_read_from_the_runtime_directory() {
    let fixture = Fixture::new();
    installed(&fixture).await;
    fixture.write_config_file("config.toml", "useDefinitionFiles = false\ncacheProxies = false\n");

    let bootstrap = Bootstrap::new(options(&fixture, Environment::untagged()));
    let handle = bootstrap.bootstrap().await.unwrap();

    assert!(!handle.has("app.name"));
    assert!(handle.container().is_empty());
}

#[tokio::test]
#[serial_test::serial]
async fn test_host_cached_configuration_wins_over_config_file() {
    let fixture = Fixture::new();
    installed(&fixture).await;
    fixture.write_config_file("config.toml", "useDefinitionFiles = true\ncacheProxies = true\n");

    let host_cache = Arc::new(MemoryCacheProvider::new());
    let cached = PluginConfig {
        use_definition_files: false,
        cache_proxies: false,
        ..PluginConfig::default()
    };
    host_cache
        .set_json(
            "dp_di_config",
            &serde_json::to_string(&cached).unwrap(),
            CacheEntryConfig::new(),
        )
        .await
        .unwrap();

    let bootstrap = Bootstrap::new(
        options(&fixture, Environment::untagged()).with_host_cache(host_cache.clone()),
    );
    let handle = bootstrap.bootstrap().await.unwrap();

    assert!(!handle.has("app.name"));
    assert!(handle.container().is_empty());
}

#[tokio::test]
#[serial_test::serial]
async fn test_configuration_is_stored_in_an_empty_host_cache() {
    let fixture = Fixture::new();
    installed(&fixture).await;
    fixture.write_config_file("config.toml", "useDefinitionFiles = true\ncacheProxies = false\n");

    let host_cache = Arc::new(MemoryCacheProvider::new());
    let bootstrap = Bootstrap::new(
        options(&fixture, Environment::untagged()).with_host_cache(host_cache.clone()),
    );
    let handle = bootstrap.bootstrap().await.unwrap();
    assert!(handle.has("app.name"));

    let stored = host_cache.get_json("dp_di_config").await.unwrap().unwrap();
    let stored: PluginConfig = serde_json::from_str(&stored).unwrap();
    assert!(stored.use_definition_files);
    assert!(!stored.cache_proxies);
}

struct DefineX;

impl ContainerListener for DefineX {
    fn before_build(&self, builder: &mut ContainerBuilder) -> Result<()> {
        builder.add_definition("x", Definition::value(7));
        Ok(())
    }
}

struct Recorder {
    name: String,
    events: Arc<Mutex<Vec<String>>>,
    fail_on_ready: bool,
}

impl ContainerListener for Recorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn before_build(&self, _builder: &mut ContainerBuilder) -> Result<()> {
        self.events.lock().unwrap().push(format!("{}:before", self.name));
        Ok(())
    }

    fn container_ready(&self, handle: &ContainerHandle) -> Result<()> {
        self.events.lock().unwrap().push(format!("{}:ready", self.name));
        if self.fail_on_ready {
            return Err(Error::not_found("missing.service"));
        }
        assert!(handle.has("app.name"));
        Ok(())
    }
}

fn recorder(name: &str, events: &Arc<Mutex<Vec<String>>>, fail_on_ready: bool) -> Arc<Recorder> {
    Arc::new(Recorder {
        name: name.to_string(),
        events: Arc::clone(events),
        fail_on_ready,
    })
}

#[tokio::test]
async fn test_listeners_run_in_registration_order() {
    let fixture = Fixture::new();
    installed(&fixture).await;
    let events = Arc::new(Mutex::new(Vec::new()));

    let mut bootstrap = Bootstrap::new(
        options(&fixture, Environment::untagged()).with_config(config_without_proxies()),
    );
    bootstrap
        .add_listener(recorder("first", &events, false))
        .add_listener(recorder("second", &events, false));
    bootstrap.bootstrap().await.unwrap();
    bootstrap.bootstrap().await.unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec!["first:before", "second:before", "first:ready", "second:ready"]
    );
}

#[tokio::test]
async fn test_listener_errors_abort_the_bootstrap() {
    let fixture = Fixture::new();
    installed(&fixture).await;
    let events = Arc::new(Mutex::new(Vec::new()));

    let mut bootstrap = Bootstrap::new(
        options(&fixture, Environment::untagged()).with_config(config_without_proxies()),
    );
    bootstrap
        .add_listener(recorder("checker", &events, true))
        .add_listener(recorder("after", &events, false));
    let err = bootstrap.bootstrap().await.unwrap_err();

    match &err {
        Error::Listener { listener, message } => {
            assert_eq!(listener, "checker");
            assert!(message.contains("missing.service"));
        }
        other => panic!("expected a listener error, got {other:?}"),
    }
    assert!(!events.lock().unwrap().contains(&"after:ready".to_string()));
    assert!(bootstrap.handle().is_none());
}
