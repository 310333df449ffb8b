use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::QueryPolicy;
use crate::models::{DateSpec, Dimension, OutputFormat, QueryRequest};
use crate::query::QueryError;

/// Raw `fetchAnalytics` arguments as a model sends them.
///
/// Numeric fields stay untyped so that `"14"`, `14.0` and garbage can be
/// coerced leniently instead of failing the call.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolArguments {
    #[serde(default)]
    pub days_ago: Option<Value>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub dimension: Option<String>,
    #[serde(default)]
    pub limit: Option<Value>,
    #[serde(default, alias = "filterCountry")]
    pub country_filter: Option<String>,
    #[serde(default, alias = "filterPageContains")]
    pub page_filter: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

impl ToolArguments {
    /// `null` means "no arguments"; anything but an object is refused
    pub fn from_value(value: Value) -> Result<Self, QueryError> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(_) => serde_json::from_value(value)
                .map_err(|e| QueryError::InvalidArgument(format!("invalid tool arguments: {e}"))),
            _ => Err(QueryError::InvalidArgument(
                "tool arguments must be a JSON object".to_string(),
            )),
        }
    }

    pub fn into_request(self, policy: &QueryPolicy) -> Result<QueryRequest, QueryError> {
        let dimension = match non_blank(self.dimension) {
            Some(raw) => raw.parse::<Dimension>()?,
            None => Dimension::Query,
        };

        let date_spec = match (non_blank(self.start_date), non_blank(self.end_date)) {
            (None, None) => DateSpec::RelativeDays(
                positive_integer(self.days_ago.as_ref())
                    .unwrap_or(policy.default_days)
                    .min(policy.max_days),
            ),
            // An absolute range wins over daysAgo; a missing bound is reported
            // by the resolver as a malformed date.
            (start, end) => DateSpec::AbsoluteRange {
                start: start.unwrap_or_default(),
                end: end.unwrap_or_default(),
            },
        };

        let limit = positive_integer(self.limit.as_ref())
            .unwrap_or(policy.default_limit)
            .min(policy.max_limit);

        let format = match non_blank(self.format) {
            Some(raw) => raw.parse::<OutputFormat>().unwrap_or_else(|_| {
                debug!(format = %raw, "unknown output format, using default");
                policy.default_format
            }),
            None => policy.default_format,
        };

        Ok(QueryRequest {
            dimension,
            limit,
            date_spec,
            country_filter: non_blank(self.country_filter),
            page_filter: self.page_filter.filter(|p| !p.trim().is_empty()),
            format,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accept integers, floats and numeric strings of at least 1
fn positive_integer(value: Option<&Value>) -> Option<u32> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if number.is_finite() && number >= 1.0 {
        Some(number.min(f64::from(u32::MAX)) as u32)
    } else {
        None
    }
}
