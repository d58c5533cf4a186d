//! Memory cache provider tests

use diplug_providers::cache::{CacheEntryConfig, CacheProvider, MemoryCacheProvider};
use std::time::Duration;

#[tokio::test]
async fn test_memory_set_get_delete() {
    let cache = MemoryCacheProvider::new();

    assert_eq!(cache.get_json("missing").await.unwrap(), None);

    cache
        .set_json("key", r#"{"a":1}"#, CacheEntryConfig::default())
        .await
        .unwrap();
    assert_eq!(
        cache.get_json("key").await.unwrap().as_deref(),
        Some(r#"{"a":1}"#)
    );
    assert!(cache.exists("key").await.unwrap());

    assert!(cache.delete("key").await.unwrap());
    assert!(!cache.delete("key").await.unwrap());
    assert!(!cache.exists("key").await.unwrap());
}

#[tokio::test]
async fn test_memory_clear_and_size() {
    let cache = MemoryCacheProvider::with_capacity(100);
    for i in 0..5 {
        cache
            .set_json(&format!("k{i}"), "1", CacheEntryConfig::default())
            .await
            .unwrap();
    }
    assert_eq!(cache.size().await.unwrap(), 5);

    cache.clear().await.unwrap();
    assert_eq!(cache.size().await.unwrap(), 0);
    assert_eq!(cache.capacity(), 100);
}

#[tokio::test]
async fn test_memory_entry_expires_after_ttl() {
    let cache = MemoryCacheProvider::new();
    cache
        .set_json(
            "short",
            "1",
            CacheEntryConfig::new().with_ttl(Duration::from_millis(50)),
        )
        .await
        .unwrap();
    assert!(cache.get_json("short").await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(cache.get_json("short").await.unwrap(), None);
}

#[tokio::test]
async fn test_memory_stats_track_hits_and_misses() {
    let cache = MemoryCacheProvider::new();
    cache
        .set_json("key", "1", CacheEntryConfig::default())
        .await
        .unwrap();

    cache.get_json("key").await.unwrap();
    cache.get_json("key").await.unwrap();
    cache.get_json("other").await.unwrap();

    let stats = cache.stats().await.unwrap();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
    assert!((stats.hit_rate - 2.0 / 3.0).abs() < f64::EPSILON);
    assert_eq!(cache.provider_name(), "memory");
}

#[tokio::test]
async fn test_memory_handles_are_independent() {
    let a = MemoryCacheProvider::new();
    let b = MemoryCacheProvider::new();
    a.set_json("key", "1", CacheEntryConfig::default())
        .await
        .unwrap();

    assert!(b.get_json("key").await.unwrap().is_none());

    // Clones share the store
    let a2 = a.clone();
    assert!(a2.get_json("key").await.unwrap().is_some());
}

#[tokio::test]
async fn test_memory_prefix_operations() {
    let cache = MemoryCacheProvider::new();
    for key in ["ns:a", "ns:b", "other:a"] {
        cache
            .set_json(key, "1", CacheEntryConfig::default())
            .await
            .unwrap();
    }

    assert_eq!(cache.size_prefix("ns:").await.unwrap(), 2);
    assert_eq!(cache.clear_prefix("ns:").await.unwrap(), 2);
    assert!(!cache.exists("ns:a").await.unwrap());
    assert!(cache.exists("other:a").await.unwrap());
    assert_eq!(cache.size().await.unwrap(), 1);
}
