//! Memcached cache provider
//!
//! Speaks the ASCII protocol over a single TCP connection opened at
//! construction. Keys memcached would reject (longer than 250 bytes or
//! containing whitespace or control characters) are replaced by their
//! SHA-256 digest.
//!
//! Memcached cannot enumerate keys, so [`size`](CacheProvider::size) and the
//! prefix operations only see the live entries among those written through
//! this handle. Keys another client wrote under the same prefix are left
//! alone.

use async_trait::async_trait;
use dashmap::DashSet;
use diplug_domain::error::{Error, Result};
use diplug_domain::ports::cache::{CacheEntryConfig, CacheProvider, CacheStats};
use memcache_async::ascii::Protocol;
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::io::ErrorKind;
use std::sync::{Arc, RwLock};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

const MAX_KEY_LEN: usize = 250;

type Connection = Protocol<Compat<TcpStream>>;

/// Memcached cache provider
#[derive(Clone)]
pub struct MemcachedCacheProvider {
    connection: Arc<Mutex<Connection>>,
    address: String,
    written: Arc<DashSet<String>>,
    stats: Arc<RwLock<CacheStats>>,
}

impl MemcachedCacheProvider {
    /// Connect to the memcached server at `host:port`
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let address = format!("{host}:{port}");
        let stream = TcpStream::connect(&address).await.map_err(|e| {
            Error::cache_with_source(format!("Failed to connect to Memcached at {address}"), e)
        })?;

        tracing::debug!(address = %address, "Connected to Memcached");

        Ok(Self {
            connection: Arc::new(Mutex::new(Protocol::new(stream.compat()))),
            address,
            written: Arc::new(DashSet::new()),
            stats: Arc::new(RwLock::new(CacheStats::new())),
        })
    }

    /// Server address as `host:port`
    pub fn server_address(&self) -> &str {
        &self.address
    }

    fn wire_key(key: &str) -> Cow<'_, str> {
        let valid = key.len() <= MAX_KEY_LEN
            && !key.is_empty()
            && !key.chars().any(|c| c.is_whitespace() || c.is_control());
        if valid {
            Cow::Borrowed(key)
        } else {
            Cow::Owned(hex::encode(Sha256::digest(key.as_bytes())))
        }
    }

    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let wire = Self::wire_key(key);
        let mut conn = self.connection.lock().await;
        match conn.get(&*wire).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::cache_with_source("Memcached get failed", e)),
        }
    }

    /// Live keys written through this handle that start with `prefix`
    ///
    /// Keys memcached has already evicted are forgotten on the way.
    async fn live_written(&self, prefix: &str) -> Result<Vec<String>> {
        let candidates: Vec<String> = self
            .written
            .iter()
            .filter(|k| k.key().starts_with(prefix))
            .map(|k| k.key().clone())
            .collect();
        let mut live = Vec::with_capacity(candidates.len());
        for key in candidates {
            if self.fetch(&key).await?.is_some() {
                live.push(key);
            } else {
                self.written.remove(&key);
            }
        }
        Ok(live)
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
impl CacheProvider for MemcachedCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        let value = self.fetch(key).await?;
        self.record(value.is_some());
        value
            .map(|bytes| {
                String::from_utf8(bytes).map_err(|e| {
                    Error::cache_with_source(format!("Memcached value for '{key}' is not UTF-8"), e)
                })
            })
            .transpose()
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        let expiration = config
            .ttl_secs()
            .map(|ttl| u32::try_from(ttl).unwrap_or(u32::MAX))
            .unwrap_or(0);
        let wire = Self::wire_key(key);
        {
            let mut conn = self.connection.lock().await;
            conn.set(&*wire, value.as_bytes(), expiration)
                .await
                .map_err(|e| Error::cache_with_source("Memcached set failed", e))?;
        }
        self.written.insert(key.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        // The protocol sends `delete <key> noreply`, so presence is read first
        let existed = self.fetch(key).await?.is_some();
        if existed {
            let wire = Self::wire_key(key);
            let mut conn = self.connection.lock().await;
            conn.delete(&*wire)
                .await
                .map_err(|e| Error::cache_with_source("Memcached delete failed", e))?;
        }
        self.written.remove(key);
        Ok(existed)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.fetch(key).await?.is_some())
    }

    async fn clear(&self) -> Result<()> {
        {
            let mut conn = self.connection.lock().await;
            conn.flush()
                .await
                .map_err(|e| Error::cache_with_source("Memcached flush failed", e))?;
        }
        self.written.clear();
        Ok(())
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
        Ok(self.live_written("").await?.len())
    }

    async fn clear_prefix(&self, prefix: &str) -> Result<usize> {
        let mut removed = 0;
        for key in self.live_written(prefix).await? {
            if self.delete(&key).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn size_prefix(&self, prefix: &str) -> Result<usize> {
        Ok(self.live_written(prefix).await?.len())
    }

    fn provider_name(&self) -> &str {
        "memcached"
    }
}

impl std::fmt::Debug for MemcachedCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemcachedCacheProvider")
            .field("server", &self.address)
            .finish()
    }
}
