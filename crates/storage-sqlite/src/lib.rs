//! SQLite storage implementation for Subtrack.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `subtrack-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The subscription repository, including the storage-side period aggregate
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place where Diesel dependencies exist. The core crate
//! is database-agnostic and works with traits.
//!
//! ```text
//!          core (domain)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!        ┌─────────┴─────────┐
//!        ▼                   ▼
//!   r2d2 pool (reads)   write actor (single writer)
//!        └─────────┬─────────┘
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod subscriptions;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, prepare_database_file, run_migrations,
    spawn_writer, DbConnection, DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use subscriptions::SubscriptionRepository;

// Re-export from subtrack-core for convenience
pub use subtrack_core::errors::{DatabaseError, Error, Result};
