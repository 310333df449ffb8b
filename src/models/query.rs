use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::query::QueryError;

/// Grouping dimension understood by the search analytics backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Query,
    Page,
    Country,
    Device,
    Date,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Query,
        Dimension::Page,
        Dimension::Country,
        Dimension::Device,
        Dimension::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Query => "query",
            Dimension::Page => "page",
            Dimension::Country => "country",
            Dimension::Device => "device",
            Dimension::Date => "date",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Dimension::ALL
            .into_iter()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| {
                QueryError::InvalidArgument(format!(
                    "unsupported dimension '{s}'; expected one of query, page, country, device, date"
                ))
            })
    }
}

/// Presentation of a normalized result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma separated, one header line plus one line per row
    #[default]
    Csv,
    /// Pipe table with a short caption, meant for people
    Markdown,
}

impl OutputFormat {
    pub fn delimiter(&self) -> char {
        match self {
            OutputFormat::Csv => ',',
            OutputFormat::Markdown => '|',
        }
    }
}

impl FromStr for OutputFormat {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "markdown" | "md" | "table" => Ok(OutputFormat::Markdown),
            other => Err(QueryError::InvalidArgument(format!(
                "unsupported format '{other}'; expected csv or markdown"
            ))),
        }
    }
}

/// Requested reporting window, before it is pinned to calendar dates
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateSpec {
    /// The last `n` days up to and including today
    RelativeDays(u32),
    /// Raw `YYYY-MM-DD` bounds, validated by the resolver
    AbsoluteRange { start: String, end: String },
}

/// One analytics question, built from a tool call.
///
/// `limit` is already clamped by the [`crate::config::QueryPolicy`] that built
/// the request. The request doubles as the memoization key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryRequest {
    pub dimension: Dimension,
    pub limit: u32,
    pub date_spec: DateSpec,
    pub country_filter: Option<String>,
    pub page_filter: Option<String>,
    pub format: OutputFormat,
}

/// Inclusive calendar-day interval, `start <= end <= today`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for ResolvedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_parsing_is_case_insensitive() {
        assert_eq!("Country".parse::<Dimension>().unwrap(), Dimension::Country);
        assert_eq!(" page ".parse::<Dimension>().unwrap(), Dimension::Page);
        assert!("browser".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_output_format_aliases() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
