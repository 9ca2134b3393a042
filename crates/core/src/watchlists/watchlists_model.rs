//! Watchlist domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::{
    CURRENT_SCHEMA_VERSION, MAX_ITEMS_PER_WATCHLIST, MAX_NAME_LENGTH, MAX_NOTE_LENGTH,
    MAX_WATCHLISTS, MIN_NAME_LENGTH,
};

/// A tracked item inside a watchlist.
///
/// `name` and `icon_url` are display copies captured when the item was added;
/// they are not kept in sync with the item catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    pub item_id: i64,
    pub name: String,
    pub icon_url: String,
    pub added_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Input model for adding an item. `added_at` is always stamped by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewWatchlistItem {
    pub item_id: i64,
    pub name: String,
    pub icon_url: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Domain model representing a named, ordered collection of tracked items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Watchlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<WatchlistItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_default: bool,
}

impl Watchlist {
    pub fn contains_item(&self, item_id: i64) -> bool {
        self.items.iter().any(|item| item.item_id == item_id)
    }

    pub fn find_item(&self, item_id: i64) -> Option<&WatchlistItem> {
        self.items.iter().find(|item| item.item_id == item_id)
    }

    /// Case-insensitive name comparison used for the uniqueness rule.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Limits enforced by the store. Defaults mirror the constants module.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistLimits {
    pub max_watchlists: usize,
    pub max_items_per_watchlist: usize,
    pub min_name_length: usize,
    pub max_name_length: usize,
    pub max_note_length: usize,
}

impl Default for WatchlistLimits {
    fn default() -> Self {
        Self {
            max_watchlists: MAX_WATCHLISTS,
            max_items_per_watchlist: MAX_ITEMS_PER_WATCHLIST,
            min_name_length: MIN_NAME_LENGTH,
            max_name_length: MAX_NAME_LENGTH,
            max_note_length: MAX_NOTE_LENGTH,
        }
    }
}

impl WatchlistLimits {
    pub fn name_fits(&self, trimmed_name: &str) -> bool {
        let len = trimmed_name.chars().count();
        len >= self.min_name_length && len <= self.max_name_length
    }

    pub fn note_fits(&self, trimmed_note: &str) -> bool {
        trimmed_note.chars().count() <= self.max_note_length
    }
}

/// The durable record persisted for one store instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistState {
    #[serde(default)]
    pub watchlists: HashMap<String, Watchlist>,
    #[serde(default)]
    pub active_watchlist_id: String,
    #[serde(default)]
    pub migrated: bool,
    #[serde(default)]
    pub schema_version: u32,
}

impl WatchlistState {
    pub fn default_watchlist(&self) -> Option<&Watchlist> {
        self.watchlists.values().find(|w| w.is_default)
    }

    pub fn default_watchlist_id(&self) -> Option<String> {
        self.default_watchlist().map(|w| w.id.clone())
    }

    pub fn name_taken(&self, name: &str, except_id: Option<&str>) -> bool {
        self.watchlists
            .values()
            .filter(|w| Some(w.id.as_str()) != except_id)
            .any(|w| w.has_name(name))
    }

    /// Default first, then most recently created first.
    pub fn ordered(&self) -> Vec<&Watchlist> {
        let mut lists: Vec<&Watchlist> = self.watchlists.values().collect();
        lists.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });
        lists
    }
}

impl Default for WatchlistState {
    fn default() -> Self {
        Self {
            watchlists: HashMap::new(),
            active_watchlist_id: String::new(),
            migrated: false,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }
}

/// Envelope written by the bulk JSON export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistExport {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub watchlists: Vec<Watchlist>,
}
