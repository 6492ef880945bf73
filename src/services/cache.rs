use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::models::SearchCoursesRequest;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Multi-tier cache for read-heavy course endpoints
///
/// L1 is an in-process moka cache. L2 is Redis, shared across instances,
/// and optional: without it the manager serves from L1 alone.
pub struct CacheManager {
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a cache manager backed by Redis
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(Arc::new(tokio::sync::Mutex::new(redis))),
            l1_cache: build_l1(l1_size, ttl_secs),
            ttl_secs,
        })
    }

    /// Create an L1-only cache manager
    pub fn in_memory(l1_size: u64, ttl_secs: u64) -> Self {
        Self {
            redis: None,
            l1_cache: build_l1(l1_size, ttl_secs),
            ttl_secs,
        }
    }

    pub fn has_shared_tier(&self) -> bool {
        self.redis.is_some()
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            let value: Option<String> = redis::cmd("GET")
                .arg(key)
                .query_async(&mut *conn)
                .await?;
            drop(conn);

            if let Some(json) = value {
                tracing::trace!("L2 cache hit: {}", key);

                // Populate L1 cache
                let bytes = json.as_bytes().to_vec();
                self.l1_cache.insert(key.to_string(), bytes).await;

                return Ok(serde_json::from_str(&json)?);
            }
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in every available tier
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

    /// Delete a value from every tier
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

    /// Invalidate all entries whose key matches a `prefix*` pattern
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<(), CacheError> {
        let prefix = pattern.trim_end_matches('*');
        let stale: Vec<Arc<String>> = self
            .l1_cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key)
            .collect();
        for key in stale {
            self.l1_cache.invalidate(key.as_str()).await;
        }

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            let keys: Vec<String> = redis::cmd("KEYS")
                .arg(pattern)
                .query_async(&mut *conn)
                .await?;

            if !keys.is_empty() {
                redis::cmd("DEL")
                    .arg(keys)
                    .query_async::<()>(&mut *conn)
                    .await?;
            }
        }

        tracing::debug!("Invalidated cache pattern: {}", pattern);
        Ok(())
    }

    /// Drop every cached view a course change can affect
    pub async fn invalidate_course(&self, course_id: Uuid) -> Result<(), CacheError> {
        self.delete(&CacheKey::course(course_id)).await?;
        self.delete(&CacheKey::course_options()).await?;
        self.invalidate_pattern(CacheKey::SEARCH_PATTERN).await
    }
}

fn build_l1(l1_size: u64, ttl_secs: u64) -> moka::future::Cache<String, Vec<u8>> {
    moka::future::CacheBuilder::new(l1_size)
        .time_to_live(Duration::from_secs(ttl_secs))
        .build()
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    pub const SEARCH_PATTERN: &'static str = "search:*";

    /// Course detail page
    pub fn course(course_id: Uuid) -> String {
        format!("course:{}", course_id)
    }

    /// Search results for one set of filters
    pub fn search(request: &SearchCoursesRequest) -> String {
        format!(
            "search:{}|{}|{}|{:?}|{:?}|{:?}|{:?}|{:?}|{:?}",
            request.q.as_deref().unwrap_or_default().trim(),
            request.state.as_deref().unwrap_or_default(),
            request.city.as_deref().unwrap_or_default().trim(),
            request.latitude,
            request.longitude,
            request.distance,
            request.sort,
            request.limit,
            request.offset,
        )
    }

    pub fn course_options() -> String {
        "courses:options".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SortKey;

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_cache_set_get() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 1000, 60)
            .await
            .expect("Failed to create cache");

        let key = "test_key";
        let value = "test_value";

        cache.set(key, &value).await.unwrap();
        let result: String = cache.get(key).await.unwrap();
        assert_eq!(result, value);

        cache.delete(key).await.unwrap();
        assert!(cache.get::<String>(key).await.is_err());
    }

    #[tokio::test]
    async fn test_in_memory_set_get_delete() {
        let cache = CacheManager::in_memory(100, 60);
        assert!(!cache.has_shared_tier());

        cache.set("course:1", &vec![1, 2, 3]).await.unwrap();
        let value: Vec<i32> = cache.get("course:1").await.unwrap();
        assert_eq!(value, vec![1, 2, 3]);

        cache.delete("course:1").await.unwrap();
        assert!(matches!(
            cache.get::<Vec<i32>>("course:1").await,
            Err(CacheError::CacheMiss(_))
        ));
    }

    #[tokio::test]
    async fn test_invalidate_pattern_keeps_other_keys() {
        let cache = CacheManager::in_memory(100, 60);
        cache.set("search:a", &1).await.unwrap();
        cache.set("search:b", &2).await.unwrap();
        cache.set("courses:options", &3).await.unwrap();

        cache.invalidate_pattern("search:*").await.unwrap();

        assert!(cache.get::<i32>("search:a").await.is_err());
        assert!(cache.get::<i32>("search:b").await.is_err());
        assert_eq!(cache.get::<i32>("courses:options").await.unwrap(), 3);
    }

    #[test]
    fn test_cache_key_builder() {
        let id = Uuid::nil();
        assert_eq!(
            CacheKey::course(id),
            "course:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(CacheKey::course_options(), "courses:options");

        let a = SearchCoursesRequest {
            q: Some("pebble ".to_string()),
            sort: Some(SortKey::Name),
            ..Default::default()
        };
        let b = SearchCoursesRequest {
            q: Some("pebble".to_string()),
            sort: Some(SortKey::Name),
            ..Default::default()
        };
        assert!(CacheKey::search(&a).starts_with("search:"));
        assert_eq!(CacheKey::search(&a), CacheKey::search(&b));
    }
}
