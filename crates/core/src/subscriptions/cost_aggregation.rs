//! Period cost aggregation over a snapshot of subscriptions.
//!
//! All functions here are pure: they take the current month as a parameter
//! instead of reading a clock, never mutate their inputs, and never fail.
//! Degenerate inputs (a subscription ending before it starts, or a period whose
//! end precedes its start) contribute zero rather than producing an error.
//!
//! The storage-side aggregate query in `storage-sqlite` reproduces exactly the
//! same clamp/span/sum rules; the two are checked against each other by
//! property tests.
//!
//! # Numeric limits
//! Totals are accumulated in an `i64`. Realistic inputs stay far below the
//! limit (a price of 10^9 minor units over 1,000 years of monthly billing is
//! about 1.2 * 10^13), so overflow is not checked.

use super::subscriptions_model::{service_name_key, QueryPeriod, Subscription, SubscriptionFilter};
use crate::utils::Month;

/// Intersects a subscription's lifetime with a query period.
///
/// The upper bound of the intersection is the smaller of the two ends, where a
/// missing subscription end falls back to the query end and a missing query end
/// falls back to the subscription end; when both are missing the range stops at
/// `now`. Open-ended subscriptions are therefore billed through the current
/// month, never to infinity.
///
/// Returns the inclusive `(start, end)` range, or `None` when they do not overlap.
pub fn clamp_range(
    sub_start: Month,
    sub_end: Option<Month>,
    period_start: Option<Month>,
    period_end: Option<Month>,
    now: Month,
) -> Option<(Month, Month)> {
    let start = match period_start {
        Some(period_start) => sub_start.max(period_start),
        None => sub_start,
    };

    let sub_bound = sub_end.or(period_end).unwrap_or(now);
    let period_bound = period_end.or(sub_end).unwrap_or(now);
    let end = sub_bound.min(period_bound);

    if end < start {
        None
    } else {
        Some((start, end))
    }
}

/// Inclusive number of calendar months from `start` to `end`.
///
/// January through January is 1, January through March is 3. Returns 0 when
/// `end` precedes `start`.
pub fn month_span(start: Month, end: Month) -> i64 {
    if end < start {
        return 0;
    }
    start.months_until(end) + 1
}

/// Whether a subscription passes the owner and service-name filters.
///
/// Owner ids must match exactly. The service-name filter is trimmed and then
/// compared case-insensitively against the stored name as-is; a blank filter
/// value is ignored.
pub fn matches_filter(subscription: &Subscription, filter: &SubscriptionFilter) -> bool {
    if let Some(user_id) = filter.user_id.as_deref() {
        if subscription.user_id != user_id {
            return false;
        }
    }

    match filter.service_name_key() {
        Some(key) => service_name_key(&subscription.service_name) == key,
        None => true,
    }
}

/// Billable cost of one subscription over the period, or 0 when it does not overlap.
pub fn subscription_cost(subscription: &Subscription, period: &QueryPeriod, now: Month) -> i64 {
    clamp_range(
        subscription.start_month,
        subscription.end_month,
        period.start,
        period.end,
        now,
    )
    .map(|(start, end)| subscription.monthly_price * month_span(start, end))
    .unwrap_or(0)
}

/// Total cost of all subscriptions matching `filter` over `period`.
pub fn sum_by_period<'a, I>(
    subscriptions: I,
    filter: &SubscriptionFilter,
    period: &QueryPeriod,
    now: Month,
) -> i64
where
    I: IntoIterator<Item = &'a Subscription>,
{
    subscriptions
        .into_iter()
        .filter(|subscription| matches_filter(subscription, filter))
        .map(|subscription| subscription_cost(subscription, period, now))
        .sum()
}
