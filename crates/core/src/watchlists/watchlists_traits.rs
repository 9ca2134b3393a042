//! Repository and service traits for watchlists.

use crate::errors::Result;
use crate::migration::LegacyFavorite;
use crate::watchlists::watchlists_model::{
    NewWatchlistItem, Watchlist, WatchlistItem, WatchlistLimits, WatchlistState,
};

/// Durable storage for the whole watchlist record of one store instance.
///
/// The store writes through on every successful mutation, so implementations
/// must replace the previous record atomically.
pub trait WatchlistRepositoryTrait: Send + Sync {
    /// Load the persisted record. `Ok(None)` means nothing was saved yet.
    fn load_state(&self) -> Result<Option<WatchlistState>>;

    /// Replace the persisted record.
    fn save_state(&self, state: &WatchlistState) -> Result<()>;
}

/// Trait for watchlist store operations.
///
/// Validation failures are reported as `Error::Watchlist` and leave the store
/// untouched. Persistence failures are logged and never reported.
pub trait WatchlistServiceTrait: Send + Sync {
    fn limits(&self) -> WatchlistLimits;

    fn create_watchlist(&self, name: &str) -> Result<String>;
    fn delete_watchlist(&self, id: &str) -> Result<()>;
    fn rename_watchlist(&self, id: &str, name: &str) -> Result<()>;

    fn get_watchlist(&self, id: &str) -> Result<Option<Watchlist>>;
    fn get_all_watchlists(&self) -> Result<Vec<Watchlist>>;
    fn get_watchlist_count(&self) -> Result<usize>;
    fn get_default_watchlist(&self) -> Result<Watchlist>;

    fn get_active_watchlist(&self) -> Result<Watchlist>;
    fn set_active_watchlist(&self, id: &str) -> Result<()>;

    fn add_item_to_watchlist(
        &self,
        watchlist_id: &str,
        item: NewWatchlistItem,
    ) -> Result<WatchlistItem>;
    fn remove_item_from_watchlist(&self, watchlist_id: &str, item_id: i64) -> Result<()>;
    fn move_item_between_watchlists(&self, from_id: &str, to_id: &str, item_id: i64)
        -> Result<()>;
    fn is_item_in_watchlist(&self, watchlist_id: &str, item_id: i64) -> Result<bool>;
    fn get_item_watchlists(&self, item_id: i64) -> Result<Vec<Watchlist>>;
    fn update_item_notes(
        &self,
        watchlist_id: &str,
        item_id: i64,
        notes: Option<&str>,
    ) -> Result<()>;
    fn clear_watchlist(&self, id: &str) -> Result<()>;

    fn export_watchlist(&self, id: &str) -> Result<Option<Watchlist>>;
    fn export_all_watchlists(&self) -> Result<Vec<Watchlist>>;
    fn export_all_watchlists_json(&self) -> Result<String>;
    fn import_watchlist(&self, watchlist: &Watchlist) -> Result<String>;
    fn import_watchlists_json(&self, json: &str) -> Result<Vec<String>>;

    /// Append legacy favorites to the default watchlist, once per store.
    /// Returns the number of items appended.
    fn migrate_from_favorites(&self, favorites: &[LegacyFavorite]) -> Result<usize>;
    fn is_migrated(&self) -> Result<bool>;
}
