//! The composite analytics operation:
//! resolve dates → build filters → query the backend → normalize.
//!
//! [`AnalyticsPipeline::run`] never fails. Every error is flattened into an
//! `Error: …` text because the consumer is a language model that can only
//! read text. [`CachedPipeline`] memoizes the whole operation.

pub mod cached;

pub use cached::{CacheStats, CachedPipeline};

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::backend::{AnalyticsBackend, BackendError};
use crate::models::{OutputFormat, QueryRequest, SearchAnalyticsQuery};
use crate::normalize::{caption, normalize, NormalizeOptions, NormalizedResult};
use crate::query::{build_filters, resolve_range, QueryError};

/// Source of "today" for date resolution
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

pub struct AnalyticsPipeline {
    backend: Arc<dyn AnalyticsBackend>,
    site_root: Option<String>,
    timeout: Duration,
    clock: Clock,
}

impl AnalyticsPipeline {
    pub fn new(backend: Arc<dyn AnalyticsBackend>, site_root: Option<String>, timeout: Duration) -> Self {
        Self {
            backend,
            site_root,
            timeout,
            clock: Arc::new(|| chrono::Utc::now().date_naive()),
        }
    }

    /// Replace the wall clock, mainly for tests
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub async fn run(&self, request: &QueryRequest) -> NormalizedResult {
        self.run_at(request, self.today()).await
    }

    pub(crate) async fn run_at(&self, request: &QueryRequest, today: NaiveDate) -> NormalizedResult {
        match self.try_run(request, today).await {
            Ok(result) => result,
            Err(e) => {
                warn!(dimension = %request.dimension, error = %e, "analytics query failed");
                NormalizedResult::failed(e)
            }
        }
    }

    async fn try_run(&self, request: &QueryRequest, today: NaiveDate) -> Result<NormalizedResult, QueryError> {
        let range = resolve_range(&request.date_spec, today)?;
        let filters = build_filters(request.country_filter.as_deref(), request.page_filter.as_deref());

        debug!(
            dimension = %request.dimension,
            limit = request.limit,
            range = %range,
            filters = ?filters.filters,
            "running analytics query"
        );

        let query = SearchAnalyticsQuery::new(request.dimension, &range, request.limit, filters);
        let rows = tokio::time::timeout(self.timeout, self.backend.query(&query))
            .await
            .map_err(|_| BackendError::Transient(format!("request timed out after {:?}", self.timeout)))??;

        let options = NormalizeOptions {
            format: request.format,
            site_root: self.site_root.clone(),
        };
        let result = normalize(request.dimension, &rows, &options);

        Ok(match request.format {
            OutputFormat::Markdown => result.with_caption(&caption(request, &range)),
            OutputFormat::Csv => result,
        })
    }
}
