//! Key/value record storage backing the watchlist repositories.

mod model;
mod repository;

pub use model::AppRecordDB;
pub use repository::{WatchlistRecordRepository, LEGACY_FAVORITES_KEY};
