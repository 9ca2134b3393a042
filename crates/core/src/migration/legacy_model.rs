//! Legacy favorites record, read once and never written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::Result;

/// One favorite from the legacy single-list format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyFavorite {
    pub item_id: i64,
    pub name: String,
    pub icon_url: String,
    pub added_at: DateTime<Utc>,
}

/// The legacy durable record, keyed by item id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyFavorites {
    #[serde(default)]
    pub favorites: HashMap<String, LegacyFavorite>,
}

/// Read access to the legacy favorites record.
pub trait LegacyFavoritesRepositoryTrait: Send + Sync {
    /// `Ok(None)` when the install never had a favorites record.
    fn load_legacy_favorites(&self) -> Result<Option<LegacyFavorites>>;
}
