//! Storage-specific error types for SQLite operations.
//!
//! Diesel and r2d2 errors are wrapped here and converted to the
//! database-agnostic errors of `flipwatch_core` before leaving the crate.

use diesel::result::Error as DieselError;
use thiserror::Error;
use flipwatch_core::errors::{DatabaseError, Error};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Record '{key}' is not valid JSON: {message}")]
    CorruptRecord { key: String, message: String },
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConnectionFailed(e) => {
                Error::Database(DatabaseError::ConnectionFailed(e.to_string()))
            }
            StorageError::PoolError(e) => {
                Error::Database(DatabaseError::PoolCreationFailed(e.to_string()))
            }
            StorageError::QueryFailed(DieselError::NotFound) => {
                Error::Database(DatabaseError::NotFound("Record not found".to_string()))
            }
            StorageError::QueryFailed(e) => {
                Error::Database(DatabaseError::QueryFailed(e.to_string()))
            }
            StorageError::CorruptRecord { key, message } => Error::Repository(format!(
                "Stored record '{}' could not be decoded: {}",
                key, message
            )),
        }
    }
}

/// Extension trait for converting Diesel results to core results.
pub trait IntoCore<T> {
    fn into_core(self) -> flipwatch_core::Result<T>;
}

impl<T> IntoCore<T> for std::result::Result<T, DieselError> {
    fn into_core(self) -> flipwatch_core::Result<T> {
        self.map_err(|e| StorageError::from(e).into())
    }
}
