//! Cache settings parsing tests

use diplug_domain::error::Error;
use diplug_domain::value_objects::cache::{DEFAULT_MEMCACHED_PORT, DEFAULT_REDIS_PORT};
use diplug_domain::{CacheBackend, CacheSettings};
use serde_json::json;

fn parse(value: serde_json::Value) -> Result<CacheSettings, serde_json::Error> {
    serde_json::from_value(value)
}

#[test]
fn test_missing_section_means_no_backend() {
    let settings = parse(json!({})).unwrap();
    assert_eq!(settings.backend(), &CacheBackend::None);
    assert_eq!(settings.namespace(), "diplug");
    assert!(settings.fallback_from().is_none());
}

#[test]
fn test_redis_with_options() {
    let settings = parse(json!({
        "type": "redis",
        "options": { "host": "cache.internal", "port": 6380 },
        "namespace": "shop"
    }))
    .unwrap();

    assert_eq!(
        settings.backend(),
        &CacheBackend::Redis {
            host: "cache.internal".to_string(),
            port: 6380
        }
    );
    assert_eq!(settings.namespace(), "shop");
    assert_eq!(
        settings.backend().address(),
        Some("cache.internal:6380".to_string())
    );
}

#[test]
fn test_default_ports() {
    let redis = parse(json!({ "type": "redis", "options": { "host": "r" } })).unwrap();
    let memcached = parse(json!({ "type": "Memcached", "options": { "host": "m" } })).unwrap();

    assert_eq!(
        redis.backend(),
        &CacheBackend::Redis {
            host: "r".to_string(),
            port: DEFAULT_REDIS_PORT
        }
    );
    assert_eq!(
        memcached.backend(),
        &CacheBackend::Memcached {
            host: "m".to_string(),
            port: DEFAULT_MEMCACHED_PORT
        }
    );
}

#[test]
fn test_network_backend_without_host_is_rejected() {
    let err = parse(json!({ "type": "memcached", "options": { "port": 11211 } })).unwrap_err();
    assert!(err.to_string().contains("cache.options.host"));
}

#[test]
fn test_unknown_type_falls_back_to_filesystem() {
    let settings = parse(json!({ "type": "xcache", "namespace": "n" })).unwrap();
    assert_eq!(settings.backend(), &CacheBackend::Filesystem);
    assert_eq!(settings.fallback_from(), Some("xcache"));
}

#[test]
fn test_apcu_and_explicit_none() {
    assert_eq!(
        parse(json!({ "type": "apcu" })).unwrap().backend(),
        &CacheBackend::Apcu
    );
    assert_eq!(
        parse(json!({ "type": "none" })).unwrap().backend(),
        &CacheBackend::None
    );
}

#[test]
fn test_serialize_keeps_original_shape() {
    let settings = CacheSettings::new(
        CacheBackend::Memcached {
            host: "m".to_string(),
            port: 11212,
        },
        "ns",
    );

    let value = serde_json::to_value(&settings).unwrap();
    assert_eq!(value["type"], "memcached");
    assert_eq!(value["options"]["host"], "m");
    assert_eq!(value["options"]["port"], 11212);
    assert_eq!(value["namespace"], "ns");

    let reparsed: CacheSettings = serde_json::from_value(value).unwrap();
    assert_eq!(reparsed, settings);
}

#[test]
fn test_try_from_error_is_configuration() {
    let raw = diplug_domain::value_objects::cache::RawCacheSettings {
        kind: Some("redis".to_string()),
        ..Default::default()
    };
    let err = CacheSettings::try_from(raw).unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}
