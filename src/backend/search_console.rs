use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use super::trait_def::{AnalyticsBackend, BackendError, BackendResult};
use crate::auth::TokenSource;
use crate::models::{AnalyticsRow, SearchAnalyticsQuery, SearchAnalyticsResponse, SiteId};

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/webmasters/v3";

/// Google Search Console search analytics client
pub struct SearchConsoleBackend {
    client: Client,
    endpoint: Url,
    site: SiteId,
    tokens: Arc<dyn TokenSource>,
}

impl SearchConsoleBackend {
    pub fn new(
        api_base: &str,
        site: SiteId,
        tokens: Arc<dyn TokenSource>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("sitelens/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for the analytics API")?;

        let endpoint = query_endpoint(api_base, &site)?;

        Ok(Self {
            client,
            endpoint,
            site,
            tokens,
        })
    }
}

/// `{api_base}/sites/{site}/searchAnalytics/query`, with the site id as one
/// percent-encoded path segment
fn query_endpoint(api_base: &str, site: &SiteId) -> Result<Url> {
    let mut url = Url::parse(api_base.trim_end_matches('/'))
        .with_context(|| format!("invalid analytics API base URL '{api_base}'"))?;

    url.path_segments_mut()
        .map_err(|_| anyhow!("analytics API base URL '{api_base}' cannot carry a path"))?
        .pop_if_empty()
        .extend(["sites", site.as_str(), "searchAnalytics", "query"]);

    Ok(url)
}

#[async_trait]
impl AnalyticsBackend for SearchConsoleBackend {
    async fn query(&self, request: &SearchAnalyticsQuery) -> BackendResult<Vec<AnalyticsRow>> {
        let token = self.tokens.access_token().await?;

        debug!(site = %self.site, start = %request.start_date, end = %request.end_date, "querying search analytics");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(BackendError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::from_status(status.as_u16(), &body));
        }

        let body: SearchAnalyticsResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Transient(format!("unreadable analytics response: {e}")))?;

        Ok(body.rows)
    }
}
