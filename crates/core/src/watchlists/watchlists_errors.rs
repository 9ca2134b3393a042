use thiserror::Error;

/// Reasons a watchlist operation is rejected.
///
/// A rejected operation never mutates the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchlistError {
    #[error("Watchlist name must be between {min} and {max} characters")]
    InvalidNameLength { min: usize, max: usize },

    #[error("A watchlist named '{0}' already exists")]
    DuplicateName(String),

    #[error("Watchlist limit of {0} reached")]
    WatchlistLimitExceeded(usize),

    #[error("Item {0} is already in the watchlist")]
    ItemAlreadyPresent(i64),

    #[error("Watchlist item limit of {0} reached")]
    ItemLimitExceeded(usize),

    #[error("Notes must be at most {0} characters")]
    NoteTooLong(usize),

    #[error("The default watchlist cannot be renamed or deleted")]
    CannotModifyDefault,

    #[error("Watchlist not found: {0}")]
    WatchlistNotFound(String),

    #[error("Item {0} not found in watchlist")]
    ItemNotFound(i64),
}
