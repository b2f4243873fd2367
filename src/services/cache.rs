use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::{CandidateHint, ProfileDocument, ProfileId};
use crate::services::store::{CandidateStream, ProfileStore, StoreError};

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Multi-tier cache manager
///
/// L1 is an in-process moka cache. L2 is Redis, shared across instances,
/// and optional: without it the manager runs L1-only.
pub struct CacheManager {
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a cache manager backed by Redis
    pub async fn connect(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(Arc::new(tokio::sync::Mutex::new(redis))),
            l1_cache: Self::build_l1(l1_size, ttl_secs),
            ttl_secs,
        })
    }

    /// Create an L1-only cache manager
    pub fn in_memory(l1_size: u64, ttl_secs: u64) -> Self {
        Self {
            redis: None,
            l1_cache: Self::build_l1(l1_size, ttl_secs),
            ttl_secs,
        }
    }

    fn build_l1(l1_size: u64, ttl_secs: u64) -> moka::future::Cache<String, Vec<u8>> {
        moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build()
    }

    pub fn has_redis(&self) -> bool {
        self.redis.is_some()
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(Some(serde_json::from_slice(&bytes)?));
        }

        let Some(redis) = &self.redis else {
            tracing::trace!("Cache miss: {}", key);
            return Ok(None);
        };

        let mut conn = redis.lock().await;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        match value {
            Some(json) => {
                tracing::trace!("L2 cache hit: {}", key);
                let parsed = serde_json::from_str(&json)?;
                self.l1_cache.insert(key.to_string(), json.into_bytes()).await;
                Ok(Some(parsed))
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Ok(None)
            }
        }
    }

    /// Set a value in cache (both tiers)
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        self.l1_cache
            .insert(key.to_string(), json.as_bytes().to_vec())
            .await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_secs)
                .arg(json)
                .query_async::<()>(&mut *conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Delete a value from both cache tiers
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("DEL")
                .arg(key)
                .query_async::<()>(&mut *conn)
                .await?;
        }
        Ok(())
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            l1_entries: self.l1_cache.entry_count(),
            redis_enabled: self.redis.is_some(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub l1_entries: u64,
    pub redis_enabled: bool,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a profile document
    pub fn profile(id: &ProfileId) -> String {
        format!("profile:{}", id)
    }
}

/// Profile store decorator that caches single-profile lookups
///
/// Candidate streams pass straight through; only `get_profile` hits are
/// cached. A cache failure is logged and the inner store answers instead.
pub struct CachedProfileStore<S: ProfileStore + ?Sized> {
    inner: Arc<S>,
    cache: Arc<CacheManager>,
}

impl<S: ProfileStore + ?Sized> CachedProfileStore<S> {
    pub fn new(inner: Arc<S>, cache: Arc<CacheManager>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    /// Drop a cached profile after it changes upstream
    pub async fn invalidate(&self, id: &ProfileId) {
        if let Err(e) = self.cache.delete(&CacheKey::profile(id)).await {
            tracing::warn!("Failed to invalidate cached profile {}: {}", id, e);
        }
    }
}

#[async_trait]
impl<S: ProfileStore + ?Sized> ProfileStore for CachedProfileStore<S> {
    async fn get_profile(&self, id: &ProfileId) -> Result<Option<ProfileDocument>, StoreError> {
        let key = CacheKey::profile(id);

        match self.cache.get::<ProfileDocument>(&key).await {
            Ok(Some(document)) => return Ok(Some(document)),
            Ok(None) => {}
            Err(e) => tracing::warn!("Profile cache read failed for {}: {}", id, e),
        }

        let document = self.inner.get_profile(id).await?;

        if let Some(document) = &document {
            if let Err(e) = self.cache.set(&key, document).await {
                tracing::warn!("Profile cache write failed for {}: {}", id, e);
            }
        }

        Ok(document)
    }

    async fn stream_candidates<'a>(&'a self, hint: CandidateHint) -> Result<CandidateStream<'a>, StoreError> {
        self.inner.stream_candidates(hint).await
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        self.inner.health_check().await
    }
}
