use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use crate::errors::Result;
use crate::utils::Month;

use super::cost_aggregation;
use super::subscriptions_model::{
    AggregationStrategy, NewSubscription, PeriodTotal, Subscription, SummaryQuery,
};
use super::subscriptions_traits::{SubscriptionRepositoryTrait, SubscriptionServiceTrait};

pub struct SubscriptionService {
    repository: Arc<dyn SubscriptionRepositoryTrait>,
    strategy: AggregationStrategy,
}

impl SubscriptionService {
    pub fn new(repository: Arc<dyn SubscriptionRepositoryTrait>) -> Self {
        Self::with_strategy(repository, AggregationStrategy::default())
    }

    pub fn with_strategy(
        repository: Arc<dyn SubscriptionRepositoryTrait>,
        strategy: AggregationStrategy,
    ) -> Self {
        SubscriptionService {
            repository,
            strategy,
        }
    }

    pub fn strategy(&self) -> AggregationStrategy {
        self.strategy
    }
}

#[async_trait]
impl SubscriptionServiceTrait for SubscriptionService {
    async fn create_subscription(&self, new_subscription: NewSubscription) -> Result<Subscription> {
        let new_subscription = new_subscription.normalized();
        new_subscription.validate()?;
        self.repository
            .insert_new_subscription(new_subscription)
            .await
    }

    fn get_period_total(&self, query: &SummaryQuery) -> Result<PeriodTotal> {
        self.get_period_total_at(query, Month::current())
    }

    fn get_period_total_at(&self, query: &SummaryQuery, now: Month) -> Result<PeriodTotal> {
        let total = match self.strategy {
            AggregationStrategy::Storage => {
                self.repository
                    .sum_by_period(&query.filter, &query.period, now)?
            }
            AggregationStrategy::InMemory => {
                let subscriptions = self.repository.load_subscriptions(&query.filter)?;
                cost_aggregation::sum_by_period(&subscriptions, &query.filter, &query.period, now)
            }
        };

        debug!(
            "Period total ({}) for filter {:?}, period {:?}, now {}: {}",
            self.strategy, query.filter, query.period, now, total
        );

        Ok(PeriodTotal::from(total))
    }
}
