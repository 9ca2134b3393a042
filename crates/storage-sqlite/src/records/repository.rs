use chrono::Utc;
use diesel::prelude::*;
use log::debug;
use std::sync::Arc;

use super::model::AppRecordDB;
use crate::db::{get_connection, DbPool};
use crate::errors::{IntoCore, StorageError};
use crate::schema::app_records::dsl::*;
use flipwatch_core::errors::Result;
use flipwatch_core::migration::{
    parse_legacy_favorites, LegacyFavorites, LegacyFavoritesRepositoryTrait,
};
use flipwatch_core::watchlists::{WatchlistRepositoryTrait, WatchlistState};

/// Record key of the legacy single-list favorites.
pub const LEGACY_FAVORITES_KEY: &str = "favorites";

/// Stores the whole watchlist record of one store instance as a JSON row.
pub struct WatchlistRecordRepository {
    pool: Arc<DbPool>,
    store_key: String,
}

impl WatchlistRecordRepository {
    pub fn new(pool: Arc<DbPool>, store_key: impl Into<String>) -> Self {
        WatchlistRecordRepository {
            pool,
            store_key: store_key.into(),
        }
    }

    fn read_record(&self, key: &str) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        app_records
            .filter(record_key.eq(key))
            .select(record_value)
            .first::<String>(&mut conn)
            .optional()
            .into_core()
    }

    fn write_record(&self, key: &str, value: String) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::replace_into(app_records)
            .values(&AppRecordDB {
                record_key: key.to_string(),
                record_value: value,
                updated_at: Utc::now().to_rfc3339(),
            })
            .execute(&mut conn)
            .into_core()?;
        Ok(())
    }

    /// Stores a legacy favorites record as-is, for installs upgraded from the
    /// single-list format.
    pub fn put_legacy_favorites(&self, json: &str) -> Result<()> {
        parse_legacy_favorites(json)?;
        self.write_record(LEGACY_FAVORITES_KEY, json.to_string())
    }
}

impl WatchlistRepositoryTrait for WatchlistRecordRepository {
    fn load_state(&self) -> Result<Option<WatchlistState>> {
        let Some(json) = self.read_record(&self.store_key)? else {
            return Ok(None);
        };
        let state = serde_json::from_str(&json).map_err(|e| StorageError::CorruptRecord {
            key: self.store_key.clone(),
            message: e.to_string(),
        })?;
        Ok(Some(state))
    }

    fn save_state(&self, state: &WatchlistState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        debug!(
            "Saving {} watchlists under '{}'",
            state.watchlists.len(),
            self.store_key
        );
        self.write_record(&self.store_key, json)
    }
}

impl LegacyFavoritesRepositoryTrait for WatchlistRecordRepository {
    fn load_legacy_favorites(&self) -> Result<Option<LegacyFavorites>> {
        self.read_record(LEGACY_FAVORITES_KEY)?
            .map(|json| parse_legacy_favorites(&json))
            .transpose()
    }
}
