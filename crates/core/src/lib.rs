//! Subtrack Core - Domain entities, services, and traits.
//!
//! This crate contains the business logic for tracking recurring subscriptions
//! and computing what they cost over a period of calendar months. It is
//! database-agnostic and defines traits that are implemented by the
//! `storage-sqlite` crate.

pub mod errors;
pub mod subscriptions;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;

pub use utils::Month;
