//! Redis cache.
//!
//! Backs the villa detail cache and the request rate limiter. The
//! connection manager reconnects on its own; callers treat cache
//! failures as misses.

use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::config::{CACHE_PREFIX_RATE_LIMIT, CACHE_PREFIX_VILLA, DEFAULT_CACHE_TTL_SECONDS};
use crate::domain::VillaDetail;
use crate::errors::{AppError, AppResult};

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
    default_ttl: u64,
}

/// Outcome of one rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub count: u64,
    pub limit: u64,
    pub allowed: bool,
}

impl RateLimitStatus {
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.count)
    }
}

impl Cache {
    pub async fn connect(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self {
            connection,
            default_ttl: DEFAULT_CACHE_TTL_SECONDS,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await.map_err(cache_error)?;

        match value {
            Some(json) => {
                let parsed = serde_json::from_str(&json).map_err(|e| {
                    AppError::internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    pub async fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("Cache serialization error: {}", e)))?;

        conn.set_ex::<_, _, ()>(key, json, ttl_seconds)
            .await
            .map_err(cache_error)?;

        Ok(())
    }

    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(key).await.map_err(cache_error)?;
        Ok(())
    }

    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    // Villa detail

    pub async fn get_villa(&self, villa_id: Uuid) -> AppResult<Option<VillaDetail>> {
        self.get(&villa_key(villa_id)).await
    }

    pub async fn set_villa(&self, detail: &VillaDetail) -> AppResult<()> {
        self.set(&villa_key(detail.villa.id), detail).await
    }

    pub async fn invalidate_villa(&self, villa_id: Uuid) -> AppResult<()> {
        self.delete(&villa_key(villa_id)).await
    }

    // Rate limiting

    /// Count one request against `identifier` in a fixed window.
    ///
    /// The window starts with the first request: the expiry is set only
    /// when INCR creates the key.
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<RateLimitStatus> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.connection.clone();

        let count: u64 = conn.incr(&key, 1u64).await.map_err(cache_error)?;
        if count == 1 {
            let _: () = conn
                .expire(&key, window_seconds as i64)
                .await
                .map_err(cache_error)?;
        }

        Ok(RateLimitStatus {
            count,
            limit: max_requests,
            allowed: count <= max_requests,
        })
    }
}

fn villa_key(villa_id: Uuid) -> String {
    format!("{}{}", CACHE_PREFIX_VILLA, villa_id)
}

fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}
