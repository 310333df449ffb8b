use chrono::{Datelike, Days, NaiveDate};
use tracing::debug;

use super::QueryError;
use crate::models::{DateSpec, ResolvedRange};

/// Pin a [`DateSpec`] to calendar days relative to `today`.
///
/// Absolute bounds given in the wrong order are swapped, and bounds in the
/// future are clamped to `today` since the backend has no data for them.
pub fn resolve_range(window: &DateSpec, today: NaiveDate) -> Result<ResolvedRange, QueryError> {
    match window {
        DateSpec::RelativeDays(days) => {
            // Dates before year 1 have no YYYY-MM-DD form
            let start = today
                .checked_sub_days(Days::new(u64::from(*days)))
                .filter(|start| start.year() >= 1)
                .ok_or_else(|| {
                    QueryError::InvalidArgument(format!(
                        "daysAgo {days} reaches further back than any recorded data"
                    ))
                })?;
            Ok(ResolvedRange { start, end: today })
        }
        DateSpec::AbsoluteRange { start, end } => {
            let mut start = parse_date("startDate", start)?;
            let mut end = parse_date("endDate", end)?;

            if start > end {
                debug!(%start, %end, "swapping reversed date range");
                std::mem::swap(&mut start, &mut end);
            }

            Ok(ResolvedRange {
                start: start.min(today),
                end: end.min(today),
            })
        }
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, QueryError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| QueryError::MalformedDate {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn absolute(start: &str, end: &str) -> DateSpec {
        DateSpec::AbsoluteRange {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    #[test]
    fn test_relative_days_end_today() {
        let today = date(2026, 10, 18);
        for days in [1, 7, 28, 90, 365] {
            let range = resolve_range(&DateSpec::RelativeDays(days), today).unwrap();
            assert_eq!(range.end, today);
            assert_eq!((range.end - range.start).num_days(), i64::from(days));
        }
    }

    #[test]
    fn test_relative_days_cross_month_and_leap_day() {
        let range = resolve_range(&DateSpec::RelativeDays(7), date(2028, 3, 3)).unwrap();
        assert_eq!(range.start, date(2028, 2, 25));

        let range = resolve_range(&DateSpec::RelativeDays(1), date(2028, 3, 1)).unwrap();
        assert_eq!(range.start, date(2028, 2, 29));
    }

    #[test]
    fn test_unrepresentable_look_back_is_refused() {
        let err = resolve_range(&DateSpec::RelativeDays(u32::MAX), date(2026, 10, 18)).unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument(ref msg) if msg.contains("daysAgo")));

        let range = resolve_range(&DateSpec::RelativeDays(540), date(2026, 10, 18)).unwrap();
        assert_eq!(range.start.to_string(), "2025-04-26");
    }

    #[test]
    fn test_absolute_range_is_identity() {
        let range = resolve_range(&absolute("2026-09-01", "2026-09-30"), date(2026, 10, 18)).unwrap();
        assert_eq!(range.start, date(2026, 9, 1));
        assert_eq!(range.end, date(2026, 9, 30));
    }

    #[test]
    fn test_reversed_absolute_range_is_swapped() {
        let range = resolve_range(&absolute("2026-09-30", "2026-09-01"), date(2026, 10, 18)).unwrap();
        assert_eq!(range.start, date(2026, 9, 1));
        assert_eq!(range.end, date(2026, 9, 30));
    }

    #[test]
    fn test_future_bounds_are_clamped_to_today() {
        let today = date(2026, 10, 18);

        let range = resolve_range(&absolute("2026-10-01", "2026-12-31"), today).unwrap();
        assert_eq!(range.start, date(2026, 10, 1));
        assert_eq!(range.end, today);

        let range = resolve_range(&absolute("2027-01-01", "2027-02-01"), today).unwrap();
        assert_eq!(range.start, today);
        assert_eq!(range.end, today);
    }

    #[test]
    fn test_malformed_date_names_the_field() {
        let err = resolve_range(&absolute("2026-09-01", "last tuesday"), date(2026, 10, 18)).unwrap_err();
        match err {
            QueryError::MalformedDate { field, value } => {
                assert_eq!(field, "endDate");
                assert_eq!(value, "last tuesday");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = resolve_range(&absolute("2026-02-30", "2026-03-01"), date(2026, 10, 18)).unwrap_err();
        assert!(err.to_string().contains("startDate"));
    }

    #[test]
    fn test_missing_bound_is_malformed() {
        let err = resolve_range(&absolute("2026-09-01", ""), date(2026, 10, 18)).unwrap_err();
        assert!(matches!(err, QueryError::MalformedDate { field: "endDate", .. }));
    }
}
