//! Path resolver tests

use diplug_domain::value_objects::{DefinitionRole, DistTemplate, FileRole};
use diplug_infrastructure::paths::{InstallLayout, PathResolver};
use std::collections::HashMap;
use std::path::PathBuf;

fn resolver() -> PathResolver {
    PathResolver::new(InstallLayout::new("/srv/app/var", "/srv/app/dist", "/srv/app/cache"))
}

#[test]
fn test_runtime_files_live_in_plugin_directory() {
    let resolver = resolver();
    let dir = PathBuf::from("/srv/app/var/plugins/dependency-injection");

    assert_eq!(resolver.config_dir(), dir);
    assert_eq!(
        resolver.resolve(FileRole::ContainerDefinitions, None),
        dir.join("container.toml")
    );
    assert_eq!(
        resolver.resolve(FileRole::Parameters, None),
        dir.join("parameters.toml")
    );
    assert_eq!(
        resolver.resolve(FileRole::PluginConfig, None),
        dir.join("config.toml")
    );
    assert_eq!(resolver.resolve(FileRole::ProxyDir, None), dir.join("generated"));
}

#[test]
fn test_environment_tag_is_prefixed_with_single_separator() {
    let resolver = resolver();
    let path = resolver.resolve(FileRole::ContainerDefinitions, Some("production"));

    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        "production.container.toml"
    );
    assert!(!path.to_string_lossy().contains(".."));
}

#[test]
fn test_empty_tag_is_no_tag() {
    let resolver = resolver();
    assert_eq!(
        resolver.resolve(FileRole::Parameters, Some("")),
        resolver.resolve(FileRole::Parameters, None)
    );
}

#[test]
fn test_tag_only_applies_to_definition_roles() {
    let resolver = resolver();
    assert_eq!(
        resolver.resolve(FileRole::PluginConfig, Some("staging")),
        resolver.resolve(FileRole::PluginConfig, None)
    );
    assert_eq!(
        resolver.resolve(FileRole::ProxyDir, Some("staging")),
        resolver.resolve(FileRole::ProxyDir, None)
    );
}

#[test]
fn test_resolution_is_deterministic() {
    let a = resolver();
    let b = resolver();
    for role in [
        FileRole::ContainerDefinitions,
        FileRole::Parameters,
        FileRole::PluginConfig,
        FileRole::ProxyDir,
    ] {
        assert_eq!(a.resolve(role, Some("dev")), b.resolve(role, Some("dev")));
    }
}

#[test]
fn test_distribution_templates_live_in_dist_dir() {
    let resolver = resolver();
    let dist = PathBuf::from("/srv/app/dist");

    assert_eq!(
        resolver.resolve(
            FileRole::DistributionTemplate(DistTemplate::ContainerDefinitions),
            Some("production")
        ),
        dist.join("container.toml.dist")
    );
    assert_eq!(
        resolver.resolve(FileRole::DistributionTemplate(DistTemplate::Parameters), None),
        dist.join("parameters.toml.dist")
    );
    assert_eq!(
        resolver.resolve(FileRole::DistributionTemplate(DistTemplate::PluginConfig), None),
        dist.join("config.toml.dist")
    );
}

#[test]
fn test_definition_source_carries_role_and_environment() {
    let source = resolver().definition_source(DefinitionRole::Container, Some("dev"));

    assert_eq!(source.role(), DefinitionRole::Container);
    assert_eq!(source.environment(), Some("dev"));
    assert!(source.is_overlay());
    assert!(source.path().ends_with("dev.container.toml"));
}

#[test]
fn test_layout_lookup_overrides_and_defaults() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("DIPLUG_VAR_DIR", "/data/var"),
        ("DIPLUG_DIST_DIR", "/data/dist"),
        ("DIPLUG_CACHE_DIR", ""),
    ]);
    let layout = InstallLayout::from_lookup(|name| vars.get(name).map(|v| (*v).to_string()));

    assert_eq!(layout.var_dir(), PathBuf::from("/data/var"));
    assert_eq!(layout.dist_dir(), PathBuf::from("/data/dist"));
    // Empty values fall back to the default
    assert_ne!(layout.cache_dir(), PathBuf::from(""));
}

#[test]
fn test_layout_builders_replace_roots() {
    let layout = InstallLayout::new("/a", "/b", "/c")
        .with_var_dir("/x")
        .with_cache_dir("/z");

    assert_eq!(layout.var_dir(), PathBuf::from("/x"));
    assert_eq!(layout.dist_dir(), PathBuf::from("/b"));
    assert_eq!(layout.cache_dir(), PathBuf::from("/z"));
}
