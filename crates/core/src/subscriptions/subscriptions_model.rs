//! Subscription domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::subscriptions_constants::{strategy_names, MAX_SERVICE_NAME_LEN};
use crate::utils::Month;
use crate::{errors::ValidationError, Error, Result};

/// Domain model representing a stored subscription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub service_name: String,
    /// Price per month in the smallest currency unit.
    pub monthly_price: i64,
    pub start_month: Month,
    /// `None` while the subscription is still active.
    pub end_month: Option<Month>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub service_name: String,
    pub monthly_price: i64,
    pub start_month: Month,
    pub end_month: Option<Month>,
}

impl NewSubscription {
    /// Trims the service name and rewrites the owner id in canonical UUID form.
    /// Ids that do not parse are left untouched for `validate` to reject.
    pub fn normalized(mut self) -> Self {
        self.service_name = self.service_name.trim().to_string();
        if let Ok(parsed) = Uuid::parse_str(self.user_id.trim()) {
            self.user_id = parsed.to_string();
        }
        self
    }

    /// Validates the write-time invariants of a subscription.
    pub fn validate(&self) -> Result<()> {
        if self.service_name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "service_name".to_string(),
            )));
        }
        if self.service_name.chars().count() > MAX_SERVICE_NAME_LEN {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Service name cannot exceed {} characters",
                MAX_SERVICE_NAME_LEN
            ))));
        }
        if self.monthly_price < 0 {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Price cannot be negative".to_string(),
            )));
        }
        if Uuid::parse_str(self.user_id.trim()).is_err() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "User ID must be a valid UUID".to_string(),
            )));
        }
        if let Some(end) = self.end_month {
            if end < self.start_month {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "End month cannot be before start month".to_string(),
                )));
            }
        }
        Ok(())
    }
}

/// Case-folded form of a service name used for case-insensitive comparison.
///
/// The storage layer persists this next to the display name so that the
/// storage-side aggregate compares exactly the same keys as the in-memory engine.
pub fn service_name_key(name: &str) -> String {
    name.to_lowercase()
}

/// Optional owner and service-name restrictions applied before aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionFilter {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

impl SubscriptionFilter {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            service_name: None,
        }
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    /// Comparison key for the service-name filter, or `None` when the filter
    /// is absent or blank. A whitespace-only value means "no filter".
    pub fn service_name_key(&self) -> Option<String> {
        self.service_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(service_name_key)
    }
}

/// Query period, open on either side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPeriod {
    pub start: Option<Month>,
    pub end: Option<Month>,
}

impl QueryPeriod {
    pub fn new(start: Option<Month>, end: Option<Month>) -> Self {
        Self { start, end }
    }

    /// Period with both bounds present.
    pub fn between(start: Month, end: Month) -> Self {
        Self::new(Some(start), Some(end))
    }

    /// Period with no bounds at all.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// True when both bounds are present and the end precedes the start.
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if end < start)
    }
}

/// A fully validated summary request: period plus filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub period: QueryPeriod,
    pub filter: SubscriptionFilter,
}

/// Total cost of the matching subscriptions over the period.
///
/// Serializes as `{"total_price": <integer>}`. Zero is an ordinary result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotal {
    pub total_price: i64,
}

impl From<i64> for PeriodTotal {
    fn from(total_price: i64) -> Self {
        Self { total_price }
    }
}

/// Where the period total is computed.
///
/// Both strategies produce identical totals for identical data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationStrategy {
    /// A single aggregate query inside the storage engine.
    #[default]
    Storage,
    /// Load the filtered snapshot and aggregate in application memory.
    InMemory,
}

impl AggregationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationStrategy::Storage => strategy_names::STORAGE,
            AggregationStrategy::InMemory => strategy_names::IN_MEMORY,
        }
    }
}

impl fmt::Display for AggregationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationStrategy {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            strategy_names::STORAGE => Ok(AggregationStrategy::Storage),
            strategy_names::IN_MEMORY | "in-memory" | "memory" => Ok(AggregationStrategy::InMemory),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown aggregation strategy '{}'",
                other
            )))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_new() -> NewSubscription {
        NewSubscription {
            id: None,
            user_id: "60601fee-2bf1-4721-ae6f-7636e79a0cba".to_string(),
            service_name: "Yandex Plus".to_string(),
            monthly_price: 400,
            start_month: Month::new(2025, 7).unwrap(),
            end_month: None,
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_input() {
        assert!(valid_new().validate().is_ok());

        let mut closed = valid_new();
        closed.end_month = Some(Month::new(2025, 7).unwrap());
        assert!(closed.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_long_name() {
        let mut sub = valid_new();
        sub.service_name = "x".repeat(MAX_SERVICE_NAME_LEN + 1);
        assert!(sub.validate().is_err());

        sub.service_name = "x".repeat(MAX_SERVICE_NAME_LEN);
        assert!(sub.validate().is_ok());
    }

    #[test]
    fn test_normalized_canonicalizes_owner() {
        let mut sub = valid_new();
        sub.user_id = " 60601FEE2BF14721AE6F7636E79A0CBA ".to_string();
        sub.service_name = "\tNetflix ".to_string();

        let sub = sub.normalized();
        assert_eq!(sub.user_id, "60601fee-2bf1-4721-ae6f-7636e79a0cba");
        assert_eq!(sub.service_name, "Netflix");
    }

    #[test]
    fn test_filter_blank_service_name_is_ignored() {
        let filter = SubscriptionFilter::default().with_service_name("   ");
        assert_eq!(filter.service_name_key(), None);

        let filter = SubscriptionFilter::default().with_service_name(" NetFlix ");
        assert_eq!(filter.service_name_key().as_deref(), Some("netflix"));
    }

    #[test]
    fn test_period_total_json_shape() {
        let json = serde_json::to_string(&PeriodTotal::from(1497)).unwrap();
        assert_eq!(json, r#"{"total_price":1497}"#);
    }

    #[test]
    fn test_aggregation_strategy_parsing() {
        assert_eq!(
            "storage".parse::<AggregationStrategy>().unwrap(),
            AggregationStrategy::Storage
        );
        assert_eq!(
            " In_Memory ".parse::<AggregationStrategy>().unwrap(),
            AggregationStrategy::InMemory
        );
        assert!("sql".parse::<AggregationStrategy>().is_err());

        let parsed: AggregationStrategy = serde_json::from_str("\"in_memory\"").unwrap();
        assert_eq!(parsed, AggregationStrategy::InMemory);
        assert_eq!(AggregationStrategy::default().to_string(), "storage");
    }
}
