use crate::errors::Result;
use crate::subscriptions::subscriptions_model::{
    NewSubscription, PeriodTotal, QueryPeriod, Subscription, SubscriptionFilter, SummaryQuery,
};
use crate::utils::Month;
use async_trait::async_trait;

/// Trait for subscription repository operations
#[async_trait]
pub trait SubscriptionRepositoryTrait: Send + Sync {
    /// Loads every stored subscription matching `filter`.
    fn load_subscriptions(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>>;

    /// Computes the period total inside the storage engine.
    ///
    /// Must return exactly what `cost_aggregation::sum_by_period` returns for
    /// the same data, filter, period and `now`.
    fn sum_by_period(
        &self,
        filter: &SubscriptionFilter,
        period: &QueryPeriod,
        now: Month,
    ) -> Result<i64>;

    /// Persists a subscription as given. Callers are responsible for validation.
    async fn insert_new_subscription(&self, new_subscription: NewSubscription)
        -> Result<Subscription>;
}

/// Trait for subscription service operations
#[async_trait]
pub trait SubscriptionServiceTrait: Send + Sync {
    async fn create_subscription(&self, new_subscription: NewSubscription) -> Result<Subscription>;

    /// Period total using the current UTC month for open-ended ranges.
    fn get_period_total(&self, query: &SummaryQuery) -> Result<PeriodTotal>;

    /// Period total with an explicit current month.
    fn get_period_total_at(&self, query: &SummaryQuery, now: Month) -> Result<PeriodTotal>;
}
