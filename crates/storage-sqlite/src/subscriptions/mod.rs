//! SQLite storage implementation for subscriptions.

mod model;
mod repository;

pub use model::{NewSubscriptionDB, SubscriptionDB};
pub use repository::SubscriptionRepository;
