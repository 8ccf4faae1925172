//! Parsing of externally supplied summary parameters.
//!
//! Everything here runs before the aggregation engine: malformed dates and
//! inverted periods are rejected as validation errors so the engine only ever
//! sees well-formed months.

use chrono::NaiveDate;
use uuid::Uuid;

use super::subscriptions_constants::messages;
use super::subscriptions_model::{QueryPeriod, SubscriptionFilter, SummaryQuery};
use crate::utils::Month;
use crate::{Error, Result};

/// Parses a month in one of the accepted layouts:
/// `YYYY-MM`, `MM-YYYY`, or a full `YYYY-MM-DD` date truncated to its month.
pub fn parse_month(value: &str) -> Result<Month> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::invalid_input(messages::EMPTY_DATE));
    }

    let parts: Vec<&str> = value.split('-').collect();
    let parsed = match parts.as_slice() {
        [year, month] if is_digits(year, 4) && is_digits(month, 2) => {
            month_from_parts(year, month)
        }
        [month, year] if is_digits(month, 2) && is_digits(year, 4) => {
            month_from_parts(year, month)
        }
        [year, month, day] if is_digits(year, 4) && is_digits(month, 2) && is_digits(day, 2) => {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(Month::from_date)
        }
        _ => None,
    };

    parsed.ok_or_else(|| Error::invalid_input(messages::INVALID_DATE_FORMAT))
}

fn is_digits(part: &str, len: usize) -> bool {
    part.len() == len && part.bytes().all(|b| b.is_ascii_digit())
}

fn month_from_parts(year: &str, month: &str) -> Option<Month> {
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    Month::new(year, month)
}

/// Treats `None`, empty and whitespace-only strings alike.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl SummaryQuery {
    /// Builds a query from raw request parameters.
    ///
    /// # Errors
    /// Returns a validation error when a month is malformed, when `end` precedes
    /// `start`, or when `user_id` is not a UUID.
    pub fn parse(
        start: Option<&str>,
        end: Option<&str>,
        user_id: Option<&str>,
        service_name: Option<&str>,
    ) -> Result<Self> {
        let start = non_blank(start).map(parse_month).transpose()?;
        let end = non_blank(end).map(parse_month).transpose()?;

        let period = QueryPeriod::new(start, end);
        if period.is_inverted() {
            return Err(Error::invalid_input(messages::END_BEFORE_START));
        }

        let user_id = non_blank(user_id)
            .map(|raw| {
                Uuid::parse_str(raw)
                    .map(|id| id.to_string())
                    .map_err(|_| Error::invalid_input(messages::INVALID_USER_ID))
            })
            .transpose()?;

        let service_name = non_blank(service_name).map(str::to_string);

        Ok(SummaryQuery {
            period,
            filter: SubscriptionFilter {
                user_id,
                service_name,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;

    fn month(y: i32, m: u32) -> Month {
        Month::new(y, m).unwrap()
    }

    fn validation_message(err: Error) -> String {
        match err {
            Error::Validation(ValidationError::InvalidInput(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_month_accepts_all_layouts() {
        assert_eq!(parse_month("2025-03").unwrap(), month(2025, 3));
        assert_eq!(parse_month("03-2025").unwrap(), month(2025, 3));
        assert_eq!(parse_month("2025-03-28").unwrap(), month(2025, 3));
        assert_eq!(parse_month("  2025-03  ").unwrap(), month(2025, 3));
    }

    #[test]
    fn test_parse_month_rejects_empty() {
        let err = parse_month("   ").unwrap_err();
        assert_eq!(validation_message(err), messages::EMPTY_DATE);
    }

    #[test]
    fn test_parse_month_rejects_malformed_values() {
        for raw in [
            "2025-13",
            "13-2025",
            "2025/03",
            "2025-3",
            "25-03",
            "2025-02-30",
            "2025-03-01T00:00:00",
            "march 2025",
            "+202-03",
        ] {
            let err = parse_month(raw).unwrap_err();
            assert_eq!(
                validation_message(err),
                messages::INVALID_DATE_FORMAT,
                "input {raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_summary_query_parses_all_fields() {
        let query = SummaryQuery::parse(
            Some("2025-01"),
            Some("03-2025"),
            Some("3F2504E0-4F89-11D3-9A0C-0305E82C3301"),
            Some("  Netflix "),
        )
        .unwrap();

        assert_eq!(query.period, QueryPeriod::between(month(2025, 1), month(2025, 3)));
        assert_eq!(
            query.filter.user_id.as_deref(),
            Some("3f2504e0-4f89-11d3-9a0c-0305e82c3301")
        );
        assert_eq!(query.filter.service_name.as_deref(), Some("Netflix"));
    }

    #[test]
    fn test_summary_query_blank_values_are_absent() {
        let query = SummaryQuery::parse(Some(""), None, Some("  "), Some("   ")).unwrap();
        assert_eq!(query, SummaryQuery::default());
    }

    #[test]
    fn test_summary_query_rejects_inverted_period() {
        let err = SummaryQuery::parse(Some("2025-05"), Some("2025-04"), None, None).unwrap_err();
        assert_eq!(validation_message(err), messages::END_BEFORE_START);
    }

    #[test]
    fn test_summary_query_accepts_single_month_period() {
        let query = SummaryQuery::parse(Some("2025-05"), Some("2025-05-31"), None, None).unwrap();
        assert_eq!(query.period, QueryPeriod::between(month(2025, 5), month(2025, 5)));
    }

    #[test]
    fn test_summary_query_rejects_bad_user_id() {
        let err = SummaryQuery::parse(None, None, Some("not-a-uuid"), None).unwrap_err();
        assert_eq!(validation_message(err), messages::INVALID_USER_ID);
    }

    #[test]
    fn test_summary_query_reports_bad_month() {
        let err = SummaryQuery::parse(Some("2025-1"), None, None, None).unwrap_err();
        assert!(err.is_validation());
    }
}
