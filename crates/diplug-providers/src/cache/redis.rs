//! Redis distributed cache provider
//!
//! The connection is established when the provider is built, so a server
//! that cannot be reached fails the caller immediately instead of on the
//! first cache hit. Reconnects after that are handled by the connection
//! manager.
//!
//! Prefix operations walk the keyspace with `SCAN MATCH`, never `KEYS`, so
//! they do not block the server on large databases.
//!
//! ## Example
//!
//! ```ignore
//! use diplug_providers::cache::RedisCacheProvider;
//!
//! let provider = RedisCacheProvider::connect("localhost", 6379).await?;
//! ```

use async_trait::async_trait;
use diplug_domain::error::{Error, Result};
use diplug_domain::ports::cache::{CacheEntryConfig, CacheProvider, CacheStats};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Keys requested per SCAN round trip
const SCAN_BATCH: usize = 500;

/// Glob pattern matching every key that starts with `prefix`
fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

/// Redis cache provider
#[derive(Clone)]
pub struct RedisCacheProvider {
    connection: ConnectionManager,
    address: String,
    stats: Arc<RwLock<CacheStats>>,
}

impl RedisCacheProvider {
    /// Connect to the Redis server at `host:port`
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let address = format!("{host}:{port}");
        let client = Client::open(format!("redis://{address}")).map_err(|e| {
            Error::cache_with_source(format!("Invalid Redis address {address}"), e)
        })?;

        let connection = ConnectionManager::new(client).await.map_err(|e| {
            Error::cache_with_source(format!("Failed to connect to Redis at {address}"), e)
        })?;

        tracing::debug!(address = %address, "Connected to Redis");

        Ok(Self {
            connection,
            address,
            stats: Arc::new(RwLock::new(CacheStats::new())),
        })
    }

    /// Server address as `host:port`
    pub fn server_address(&self) -> &str {
        &self.address
    }

    /// Every key starting with `prefix`, collected with SCAN
    async fn scan_prefix(&self, prefix: &str) -> Result<HashSet<String>> {
        let mut conn = self.connection.clone();
        let pattern = prefix_pattern(prefix);
        let mut keys = HashSet::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| Error::cache_with_source("Redis SCAN failed", e))?;
            keys.extend(batch);
            if next == 0 {
                return Ok(keys);
            }
            cursor = next;
        }
    }

    fn record(&self, hit: bool) {
        if let Ok(mut stats) = self.stats.write() {
            if hit {
                stats.record_hit();
            } else {
                stats.record_miss();
            }
        }
    }
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| Error::cache_with_source("Redis GET failed", e))?;
        self.record(value.is_some());
        Ok(value)
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        let mut conn = self.connection.clone();
        let result: redis::RedisResult<()> = match config.ttl_secs() {
            Some(ttl) => conn.set_ex(key, value, ttl).await,
            None => conn.set(key, value).await,
        };
        result.map_err(|e| Error::cache_with_source("Redis SET failed", e))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection.clone();
        let deleted: i64 = conn
            .del(key)
            .await
            .map_err(|e| Error::cache_with_source("Redis DEL failed", e))?;
        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection.clone();
        conn.exists(key)
            .await
            .map_err(|e| Error::cache_with_source("Redis EXISTS failed", e))
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.connection.clone();
        redis::cmd("FLUSHDB")
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| Error::cache_with_source("Redis FLUSHDB failed", e))
    }

    async fn stats(&self) -> Result<CacheStats> {
        let entries = self.size().await?;
        let mut stats = self
            .stats
            .read()
            .map_err(|_| Error::internal("Failed to read cache stats"))?
            .clone();
        stats.entries = entries as u64;
        Ok(stats)
    }

    async fn size(&self) -> Result<usize> {
        let mut conn = self.connection.clone();
        redis::cmd("DBSIZE")
            .query_async::<usize>(&mut conn)
            .await
            .map_err(|e| Error::cache_with_source("Redis DBSIZE failed", e))
    }

    async fn clear_prefix(&self, prefix: &str) -> Result<usize> {
        let keys: Vec<String> = self.scan_prefix(prefix).await?.into_iter().collect();
        let mut conn = self.connection.clone();
        let mut removed = 0;
        for chunk in keys.chunks(SCAN_BATCH) {
            let deleted: usize = conn
                .del(chunk)
                .await
                .map_err(|e| Error::cache_with_source("Redis DEL failed", e))?;
            removed += deleted;
        }
        Ok(removed)
    }

    async fn size_prefix(&self, prefix: &str) -> Result<usize> {
        Ok(self.scan_prefix(prefix).await?.len())
    }

    fn provider_name(&self) -> &str {
        "redis"
    }
}

impl std::fmt::Debug for RedisCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheProvider")
            .field("server", &self.address)
            .finish()
    }
}
