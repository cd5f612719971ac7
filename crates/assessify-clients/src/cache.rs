//! In-process TTL cache backing the engine's `CacheGateway` seam.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use tracing::debug;

use assessify_core::traits::CacheGateway;

const DEFAULT_CAPACITY: u64 = 10_000;

#[derive(Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Async in-memory cache where each entry carries its own time-to-live.
pub struct MemoryCache {
    inner: Cache<String, Entry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { inner }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheGateway for MemoryCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let hit = self.inner.get(key).await;
        debug!(key, hit = hit.is_some(), "cache lookup");
        Ok(hit.map(|entry| entry.value))
    }

    async fn set_with_ttl(&self, key: &str, ttl_secs: u64, value: &str) -> anyhow::Result<()> {
        let entry = Entry {
            value: value.to_string(),
            ttl: Duration::from_secs(ttl_secs),
        };
        self.inner.insert(key.to_string(), entry).await;
        Ok(())
    }
}
