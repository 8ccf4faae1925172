//! Database models for subscriptions.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use subtrack_core::subscriptions::{service_name_key, NewSubscription, Subscription};
use subtrack_core::Month;

/// Database model for subscriptions
#[derive(Queryable, Identifiable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::subscriptions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDB {
    pub id: String,
    pub user_id: String,
    pub service_name: String,
    pub monthly_price: i64,
    pub start_month: NaiveDate,
    pub end_month: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for creating a new subscription
#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::subscriptions)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscriptionDB {
    pub id: String,
    pub user_id: String,
    pub service_name: String,
    pub service_name_key: String,
    pub monthly_price: i64,
    pub start_month: NaiveDate,
    pub end_month: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewSubscriptionDB {
    /// Builds the insert row, assigning an id when none was supplied.
    ///
    /// Months are stored as their first day so that stored dates compare and
    /// format exactly like `Month` values.
    pub fn from_domain(domain: NewSubscription, id: String, timestamp: NaiveDateTime) -> Self {
        Self {
            id: domain.id.unwrap_or(id),
            service_name_key: service_name_key(&domain.service_name),
            user_id: domain.user_id,
            service_name: domain.service_name,
            monthly_price: domain.monthly_price,
            start_month: domain.start_month.first_day(),
            end_month: domain.end_month.map(|m| m.first_day()),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }
}

// Conversion to domain models
impl From<SubscriptionDB> for Subscription {
    fn from(db: SubscriptionDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            service_name: db.service_name,
            monthly_price: db.monthly_price,
            start_month: Month::from_date(db.start_month),
            end_month: db.end_month.map(Month::from_date),
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
