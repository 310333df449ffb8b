use chrono::NaiveDate;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::AnalyticsPipeline;
use crate::models::QueryRequest;
use crate::normalize::NormalizedResult;

/// Cache key: the full request plus the day it was resolved on, so a relative
/// window does not outlive midnight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    request: QueryRequest,
    today: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Time-bounded memoization of [`AnalyticsPipeline`].
///
/// Failures and empty results are cached as well, so an erroring backend is
/// not hammered. Entries leave only through the TTL. Identical requests that
/// miss concurrently are not coalesced and may both reach the backend.
pub struct CachedPipeline {
    inner: Arc<AnalyticsPipeline>,
    results: Cache<CacheKey, NormalizedResult>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedPipeline {
    pub fn new(inner: AnalyticsPipeline, ttl: Duration) -> Self {
        let results = Cache::builder().time_to_live(ttl).build();

        Self {
            inner: Arc::new(inner),
            results,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub async fn run(&self, request: &QueryRequest) -> NormalizedResult {
        let key = CacheKey {
            request: request.clone(),
            today: self.inner.today(),
        };

        if let Some(cached) = self.results.get(&key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(dimension = %request.dimension, "analytics cache hit");
            return cached;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let result = self.inner.run_at(request, key.today).await;
        self.results.insert(key, result.clone()).await;

        result
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
