use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{Tool, ToolArguments, ToolDefinition};
use crate::config::QueryPolicy;
use crate::models::Dimension;
use crate::pipeline::CachedPipeline;

pub const FETCH_ANALYTICS: &str = "fetchAnalytics";

/// Search performance lookup for the configured site
pub struct FetchAnalyticsTool {
    pipeline: Arc<CachedPipeline>,
    policy: QueryPolicy,
}

impl FetchAnalyticsTool {
    pub fn new(pipeline: Arc<CachedPipeline>, policy: QueryPolicy) -> Self {
        Self { pipeline, policy }
    }
}

pub fn fetch_analytics_definition(policy: &QueryPolicy) -> ToolDefinition {
    let dimensions: Vec<&str> = Dimension::ALL.iter().map(Dimension::as_str).collect();

    ToolDefinition {
        name: FETCH_ANALYTICS.to_string(),
        description: format!(
            "Fetch Google Search Console performance (clicks, impressions, CTR, average position) \
             for the site, grouped by one dimension. Returns a text table with at most {} rows, \
             ordered by the backend's ranking.",
            policy.max_limit
        ),
        parameters: json!({
            "type": "object",
            "properties": {
                "daysAgo": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": policy.max_days,
                    "description": format!(
                        "Days to look back from today (default {}). Ignored when startDate and endDate are given.",
                        policy.default_days
                    )
                },
                "startDate": {
                    "type": "string",
                    "format": "date",
                    "description": "First day of an explicit range, YYYY-MM-DD. Requires endDate."
                },
                "endDate": {
                    "type": "string",
                    "format": "date",
                    "description": "Last day of an explicit range, YYYY-MM-DD. Requires startDate."
                },
                "dimension": {
                    "type": "string",
                    "enum": dimensions,
                    "description": "Group results by search query, page URL, country, device or date."
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": policy.max_limit,
                    "description": format!("Number of rows to return (default {}).", policy.default_limit)
                },
                "countryFilter": {
                    "type": "string",
                    "description": "Only traffic from this 3-letter country code, e.g. IND or USA."
                },
                "pageFilter": {
                    "type": "string",
                    "description": "Only pages whose URL contains this text, e.g. /blog/."
                },
                "format": {
                    "type": "string",
                    "enum": ["csv", "markdown"],
                    "description": "csv (compact, raw CTR) or markdown (table, CTR in percent)."
                }
            },
            "required": ["dimension"]
        }),
    }
}

#[async_trait]
impl Tool for FetchAnalyticsTool {
    fn definition(&self) -> ToolDefinition {
        fetch_analytics_definition(&self.policy)
    }

    async fn invoke(&self, arguments: Value) -> String {
        debug!(tool = FETCH_ANALYTICS, %arguments, "tool call");

        let request = match ToolArguments::from_value(arguments).and_then(|args| args.into_request(&self.policy)) {
            Ok(request) => request,
            Err(e) => {
                warn!(tool = FETCH_ANALYTICS, error = %e, "rejected tool arguments");
                return format!("Error: {e}");
            }
        };

        self.pipeline.run(&request).await.to_string()
    }
}
