//! SQLite storage implementation for Flipwatch.
//!
//! Implements the repository traits defined in `flipwatch-core` on top of
//! Diesel and r2d2:
//! - Database initialization, connection pooling and embedded migrations
//! - A key/value record table holding one JSON record per store instance
//! - The legacy favorites record consumed by the one-time migration
//!
//! This crate is the only place in the workspace where Diesel dependencies exist.

pub mod db;
pub mod errors;
pub mod records;
pub mod schema;

// Re-export database utilities
pub use db::{create_pool, get_connection, init, run_migrations, DbConnection, DbPool};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use records::{WatchlistRecordRepository, LEGACY_FAVORITES_KEY};

// Re-export from flipwatch-core for convenience
pub use flipwatch_core::errors::{DatabaseError, Error, Result};
