use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Date, Nullable, Text};
use diesel::SqliteConnection;
use log::{debug, info};
use std::sync::Arc;
use uuid::Uuid;

use subtrack_core::subscriptions::{
    NewSubscription, QueryPeriod, Subscription, SubscriptionFilter, SubscriptionRepositoryTrait,
};
use subtrack_core::{Month, Result};

use super::model::{NewSubscriptionDB, SubscriptionDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::subscriptions;
use async_trait::async_trait;

/// Period total computed in a single statement.
///
/// Binds: `?1` period start, `?2` period end (both nullable), `?3` current
/// month, `?4` owner id and `?5` case-folded service name (both nullable).
/// Dates are stored as `YYYY-MM-DD` text, so `MIN`/`MAX` compare them in
/// calendar order. The upper bound mirrors `cost_aggregation::clamp_range`.
const SUM_BY_PERIOD_SQL: &str = r#"
    WITH ranges AS (
        SELECT
            s.monthly_price AS price,
            MAX(s.start_month, COALESCE(?1, s.start_month)) AS eff_start,
            MIN(COALESCE(s.end_month, ?2, ?3), COALESCE(?2, s.end_month, ?3)) AS eff_end
        FROM subscriptions s
        WHERE (?4 IS NULL OR s.user_id = ?4)
          AND (?5 IS NULL OR s.service_name_key = ?5)
    )
    SELECT COALESCE(SUM(
        price * (
            (CAST(strftime('%Y', eff_end) AS INTEGER) - CAST(strftime('%Y', eff_start) AS INTEGER)) * 12
            + (CAST(strftime('%m', eff_end) AS INTEGER) - CAST(strftime('%m', eff_start) AS INTEGER))
            + 1
        )
    ), 0) AS total
    FROM ranges
    WHERE eff_end >= eff_start
"#;

#[derive(QueryableByName, Debug)]
struct PeriodTotalRow {
    #[diesel(sql_type = BigInt)]
    total: i64,
}

pub struct SubscriptionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SubscriptionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SubscriptionRepository { pool, writer }
    }
}

#[async_trait]
impl SubscriptionRepositoryTrait for SubscriptionRepository {
    fn load_subscriptions(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = subscriptions::table.into_boxed();
        if let Some(owner) = filter.user_id.clone() {
            query = query.filter(subscriptions::user_id.eq(owner));
        }
        if let Some(key) = filter.service_name_key() {
            query = query.filter(subscriptions::service_name_key.eq(key));
        }

        let rows = query
            .select(SubscriptionDB::as_select())
            .order((subscriptions::start_month.asc(), subscriptions::id.asc()))
            .load::<SubscriptionDB>(&mut conn)
            .into_core()?;

        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    fn sum_by_period(
        &self,
        filter: &SubscriptionFilter,
        period: &QueryPeriod,
        now: Month,
    ) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;

        let row: PeriodTotalRow = diesel::sql_query(SUM_BY_PERIOD_SQL)
            .bind::<Nullable<Date>, _>(period.start.map(NaiveDate::from))
            .bind::<Nullable<Date>, _>(period.end.map(NaiveDate::from))
            .bind::<Date, _>(NaiveDate::from(now))
            .bind::<Nullable<Text>, _>(filter.user_id.clone())
            .bind::<Nullable<Text>, _>(filter.service_name_key())
            .get_result(&mut conn)
            .into_core()?;

        debug!(
            "Storage aggregate for filter {:?}, period {:?}, now {}: {}",
            filter, period, now, row.total
        );
        Ok(row.total)
    }

    async fn insert_new_subscription(
        &self,
        new_subscription: NewSubscription,
    ) -> Result<Subscription> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Subscription> {
                let row = NewSubscriptionDB::from_domain(
                    new_subscription,
                    Uuid::new_v4().to_string(),
                    Utc::now().naive_utc(),
                );

                let inserted = diesel::insert_into(subscriptions::table)
                    .values(&row)
                    .returning(SubscriptionDB::as_returning())
                    .get_result(conn)
                    .into_core()?;

                info!(
                    "Inserted subscription {} ({}) for user {}",
                    inserted.id, inserted.service_name, inserted.user_id
                );
                Ok(Subscription::from(inserted))
            })
            .await
    }
}
