//! Subscriptions module - domain models, period cost aggregation, services, and traits.

pub mod cost_aggregation;
mod subscriptions_constants;
mod subscriptions_model;
mod subscriptions_service;
mod subscriptions_traits;
mod summary_query;

pub use subscriptions_constants::{messages, MAX_SERVICE_NAME_LEN};
pub use subscriptions_model::{
    service_name_key, AggregationStrategy, NewSubscription, PeriodTotal, QueryPeriod,
    Subscription, SubscriptionFilter, SummaryQuery,
};
pub use subscriptions_service::SubscriptionService;
pub use subscriptions_traits::{SubscriptionRepositoryTrait, SubscriptionServiceTrait};
pub use summary_query::parse_month;
