//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use sitelens::backend::{AnalyticsBackend, BackendError, BackendResult};
use sitelens::config::QueryPolicy;
use sitelens::models::{AnalyticsRow, SearchAnalyticsQuery};
use sitelens::pipeline::{AnalyticsPipeline, CachedPipeline};
use sitelens::tool::FetchAnalyticsTool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

/// Backend double that counts calls and remembers the last query
pub struct FakeBackend {
    outcome: BackendResult<Vec<AnalyticsRow>>,
    delay: Duration,
    calls: AtomicUsize,
    queries: Mutex<Vec<SearchAnalyticsQuery>>,
}

impl FakeBackend {
    pub fn with_rows(rows: Vec<AnalyticsRow>) -> Arc<Self> {
        Arc::new(Self::new(Ok(rows), Duration::ZERO))
    }

    pub fn failing(error: BackendError) -> Arc<Self> {
        Arc::new(Self::new(Err(error), Duration::ZERO))
    }

    pub fn slow(rows: Vec<AnalyticsRow>, delay: Duration) -> Arc<Self> {
        Arc::new(Self::new(Ok(rows), delay))
    }

    fn new(outcome: BackendResult<Vec<AnalyticsRow>>, delay: Duration) -> Self {
        Self {
            outcome,
            delay,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<SearchAnalyticsQuery> {
        self.queries.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl AnalyticsBackend for FakeBackend {
    async fn query(&self, request: &SearchAnalyticsQuery) -> BackendResult<Vec<AnalyticsRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }
}

pub fn country_rows() -> Vec<AnalyticsRow> {
    vec![
        AnalyticsRow::new("IND", 120, 5000, 0.024, 8.3),
        AnalyticsRow::new("USA", 80, 3000, 0.0267, 10.1),
    ]
}

pub fn cached_pipeline(backend: Arc<FakeBackend>, ttl: Duration) -> Arc<CachedPipeline> {
    let pipeline = AnalyticsPipeline::new(
        backend,
        Some("https://www.example.com".to_string()),
        Duration::from_secs(5),
    )
    .with_clock(today);
    Arc::new(CachedPipeline::new(pipeline, ttl))
}

pub fn fetch_tool(backend: Arc<FakeBackend>) -> FetchAnalyticsTool {
    FetchAnalyticsTool::new(
        cached_pipeline(backend, Duration::from_secs(3600)),
        QueryPolicy::default(),
    )
}
