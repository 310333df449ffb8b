//! Request and response bodies of the search analytics query endpoint

use serde::{Deserialize, Deserializer, Serialize};

use super::query::{Dimension, ResolvedRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Equals,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionFilter {
    pub dimension: Dimension,
    pub operator: FilterOperator,
    pub expression: String,
}

/// Filters that must all match (the backend ANDs filters inside one group)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub filters: Vec<DimensionFilter>,
}

impl FilterGroup {
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalyticsQuery {
    pub start_date: String,
    pub end_date: String,
    pub dimensions: Vec<Dimension>,
    pub row_limit: u32,
    /// Left out of the body when there is nothing to filter on
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimension_filter_groups: Vec<FilterGroup>,
}

impl SearchAnalyticsQuery {
    pub fn new(
        dimension: Dimension,
        range: &ResolvedRange,
        row_limit: u32,
        filters: FilterGroup,
    ) -> Self {
        let dimension_filter_groups = if filters.is_empty() {
            Vec::new()
        } else {
            vec![filters]
        };

        Self {
            start_date: range.start.format("%Y-%m-%d").to_string(),
            end_date: range.end.format("%Y-%m-%d").to_string(),
            dimensions: vec![dimension],
            row_limit,
            dimension_filter_groups,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchAnalyticsResponse {
    #[serde(default)]
    pub rows: Vec<AnalyticsRow>,
}

/// One backend record. Counts arrive as JSON doubles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsRow {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub clicks: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub impressions: u64,
    #[serde(default)]
    pub ctr: f64,
    #[serde(default)]
    pub position: f64,
}

impl AnalyticsRow {
    pub fn new(key: impl Into<String>, clicks: u64, impressions: u64, ctr: f64, position: f64) -> Self {
        Self {
            keys: vec![key.into()],
            clicks,
            impressions,
            ctr,
            position,
        }
    }

    /// Value of the single grouping dimension
    pub fn key(&self) -> &str {
        self.keys.first().map(String::as_str).unwrap_or("")
    }
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && value > 0.0 {
        Ok(value.round() as u64)
    } else {
        Ok(0)
    }
}
