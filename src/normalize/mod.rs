//! Rendering backend rows as compact text for a token-budgeted reader.
//!
//! Two presentations of the same data are available: CSV for machine
//! consumption (raw CTR) and a Markdown table for people (CTR in percent).
//! Rows keep the backend's order.

use std::fmt;

use crate::models::{AnalyticsRow, Dimension, OutputFormat, QueryRequest, ResolvedRange};

/// Rendered when the backend returned no rows
pub const NO_DATA: &str = "No data found for this period.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedResult {
    NoData,
    /// Flattened error text, already prefixed with `Error:`
    Failed(String),
    Table(String),
}

impl NormalizedResult {
    pub fn failed(err: impl fmt::Display) -> Self {
        NormalizedResult::Failed(format!("Error: {err}"))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, NormalizedResult::Failed(_))
    }

    /// Put `caption` above a table; sentinels are left alone
    pub fn with_caption(self, caption: &str) -> Self {
        match self {
            NormalizedResult::Table(table) => NormalizedResult::Table(format!("{caption}\n\n{table}")),
            other => other,
        }
    }
}

impl fmt::Display for NormalizedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedResult::NoData => f.write_str(NO_DATA),
            NormalizedResult::Failed(text) | NormalizedResult::Table(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    pub format: OutputFormat,
    /// Prefix stripped from page keys, e.g. `https://www.example.com`
    pub site_root: Option<String>,
}

pub fn normalize(dimension: Dimension, rows: &[AnalyticsRow], options: &NormalizeOptions) -> NormalizedResult {
    if rows.is_empty() {
        return NormalizedResult::NoData;
    }

    let delimiter = options.format.delimiter();
    let site_root = options.site_root.as_deref().filter(|root| !root.is_empty());

    let mut lines = Vec::with_capacity(rows.len() + 2);
    match options.format {
        OutputFormat::Csv => {
            lines.push(format!("{dimension},clicks,impressions,ctr,position"));
            for row in rows {
                lines.push(format!(
                    "{},{},{},{},{:.1}",
                    display_key(dimension, row.key(), delimiter, site_root),
                    row.clicks,
                    row.impressions,
                    row.ctr,
                    row.position
                ));
            }
        }
        OutputFormat::Markdown => {
            lines.push(format!("| {dimension} | clicks | impressions | ctr | position |"));
            lines.push("| :--- | ---: | ---: | ---: | ---: |".to_string());
            for row in rows {
                lines.push(format!(
                    "| {} | {} | {} | {:.1}% | {:.1} |",
                    display_key(dimension, row.key(), delimiter, site_root),
                    row.clicks,
                    row.impressions,
                    row.ctr * 100.0,
                    row.position
                ));
            }
        }
    }

    NormalizedResult::Table(lines.join("\n"))
}

/// Key as it appears in a line. The delimiter is dropped (not escaped) so
/// every line has the same column count; line breaks become spaces.
fn display_key(dimension: Dimension, raw: &str, delimiter: char, site_root: Option<&str>) -> String {
    let key = match (dimension, site_root) {
        (Dimension::Page, Some(root)) => raw
            .strip_prefix(root)
            .filter(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
            .unwrap_or(raw),
        _ => raw,
    };

    let key: String = key
        .chars()
        .filter(|c| *c != delimiter)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();

    if dimension == Dimension::Page && key.trim().is_empty() {
        "/".to_string()
    } else {
        key
    }
}

/// Heading placed above Markdown tables
pub fn caption(request: &QueryRequest, range: &ResolvedRange) -> String {
    let mut text = format!(
        "### Top {} {} rows ({range})",
        request.limit, request.dimension
    );
    if let Some(country) = request.country_filter.as_deref().filter(|c| !c.trim().is_empty()) {
        text.push_str(&format!("\n- **Country:** {}", country.trim().to_uppercase()));
    }
    if let Some(page) = request.page_filter.as_deref().filter(|p| !p.trim().is_empty()) {
        text.push_str(&format!("\n- **URL contains:** '{page}'"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateSpec;
    use chrono::NaiveDate;

    fn csv() -> NormalizeOptions {
        NormalizeOptions::default()
    }

    fn markdown() -> NormalizeOptions {
        NormalizeOptions {
            format: OutputFormat::Markdown,
            site_root: None,
        }
    }

    fn country_rows() -> Vec<AnalyticsRow> {
        vec![
            AnalyticsRow::new("IND", 120, 5000, 0.024, 8.3),
            AnalyticsRow::new("USA", 80, 3000, 0.0267, 10.1),
        ]
    }

    #[test]
    fn test_empty_rows_yield_no_data_for_every_dimension() {
        for dimension in Dimension::ALL {
            for options in [csv(), markdown()] {
                let result = normalize(dimension, &[], &options);
                assert_eq!(result, NormalizedResult::NoData);
                assert_eq!(result.to_string(), NO_DATA);
            }
        }
    }

    #[test]
    fn test_csv_rows_keep_backend_order() {
        let result = normalize(Dimension::Country, &country_rows(), &csv());
        assert_eq!(
            result.to_string(),
            "country,clicks,impressions,ctr,position\nIND,120,5000,0.024,8.3\nUSA,80,3000,0.0267,10.1"
        );
    }

    #[test]
    fn test_csv_has_one_line_per_row_plus_header() {
        for k in [1usize, 3, 25, 50] {
            let rows: Vec<_> = (0..k)
                .map(|i| AnalyticsRow::new(format!("query {i}"), (k - i) as u64, 100, 0.01, 3.0))
                .collect();
            let text = normalize(Dimension::Query, &rows, &csv()).to_string();
            assert_eq!(text.lines().count(), k + 1);
        }
    }

    #[test]
    fn test_delimiter_is_stripped_from_keys() {
        let rows = vec![
            AnalyticsRow::new("shoes, red, cheap", 5, 50, 0.1, 2.0),
            AnalyticsRow::new("line\nbreak", 1, 10, 0.1, 2.0),
        ];

        let text = normalize(Dimension::Query, &rows, &csv()).to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert_eq!(line.split(',').count(), 5, "bad column count in {line:?}");
        }
        assert!(lines[1].starts_with("shoes red cheap,"));

        let rows = vec![AnalyticsRow::new("a | b", 5, 50, 0.1, 2.0)];
        let text = normalize(Dimension::Query, &rows, &markdown()).to_string();
        let last = text.lines().last().unwrap();
        assert_eq!(last.matches('|').count(), 6);
    }

    #[test]
    fn test_markdown_renders_ctr_as_percent() {
        let text = normalize(Dimension::Country, &country_rows(), &markdown()).to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "| country | clicks | impressions | ctr | position |");
        assert_eq!(lines[2], "| IND | 120 | 5000 | 2.4% | 8.3 |");
        assert_eq!(lines[3], "| USA | 80 | 3000 | 2.7% | 10.1 |");
    }

    #[test]
    fn test_page_keys_drop_site_root() {
        let options = NormalizeOptions {
            format: OutputFormat::Csv,
            site_root: Some("https://www.example.com".to_string()),
        };
        let rows = vec![
            AnalyticsRow::new("https://www.example.com/blog/rust/", 10, 100, 0.1, 1.5),
            AnalyticsRow::new("https://www.example.com", 9, 100, 0.09, 1.0),
            AnalyticsRow::new("https://blog.example.com/post", 1, 10, 0.1, 4.0),
        ];

        let text = normalize(Dimension::Page, &rows, &options).to_string();
        let keys: Vec<_> = text
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(keys, vec!["/blog/rust/", "/", "https://blog.example.com/post"]);
    }

    #[test]
    fn test_site_root_must_end_at_a_host_boundary() {
        let options = NormalizeOptions {
            format: OutputFormat::Csv,
            site_root: Some("https://www.example.com".to_string()),
        };
        let rows = vec![
            AnalyticsRow::new("https://www.example.com.au/pricing", 1, 10, 0.1, 2.0),
            AnalyticsRow::new("https://www.example.com:8443/admin", 1, 10, 0.1, 2.0),
            AnalyticsRow::new("https://www.example.com?ref=mail", 1, 10, 0.1, 2.0),
            AnalyticsRow::new("https://www.example.com#top", 1, 10, 0.1, 2.0),
        ];

        let text = normalize(Dimension::Page, &rows, &options).to_string();
        let keys: Vec<_> = text
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(
            keys,
            vec![
                "https://www.example.com.au/pricing",
                "https://www.example.com:8443/admin",
                "?ref=mail",
                "#top",
            ]
        );
    }

    #[test]
    fn test_site_root_only_applies_to_pages() {
        let options = NormalizeOptions {
            format: OutputFormat::Csv,
            site_root: Some("https://www.example.com".to_string()),
        };
        let rows = vec![AnalyticsRow::new("https://www.example.com", 1, 1, 1.0, 1.0)];
        let text = normalize(Dimension::Query, &rows, &options).to_string();
        assert!(text.lines().nth(1).unwrap().starts_with("https://www.example.com,"));
    }

    #[test]
    fn test_caption_lists_filters() {
        let request = QueryRequest {
            dimension: Dimension::Page,
            limit: 5,
            date_spec: DateSpec::RelativeDays(7),
            country_filter: Some("ind".to_string()),
            page_filter: Some("/blog/".to_string()),
            format: OutputFormat::Markdown,
        };
        let range = ResolvedRange {
            start: NaiveDate::from_ymd_opt(2026, 10, 11).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
        };

        assert_eq!(
            caption(&request, &range),
            "### Top 5 page rows (2026-10-11 to 2026-10-18)\n- **Country:** IND\n- **URL contains:** '/blog/'"
        );
    }

    #[test]
    fn test_caption_is_not_added_to_sentinels() {
        assert_eq!(NormalizedResult::NoData.with_caption("### x"), NormalizedResult::NoData);
        let failed = NormalizedResult::failed("boom");
        assert_eq!(failed.clone().with_caption("### x"), failed);
        assert_eq!(failed.to_string(), "Error: boom");
    }
}
