use log::warn;

use crate::errors::Result;
use crate::watchlists::WatchlistItem;

use super::legacy_model::{LegacyFavorite, LegacyFavorites};

/// Parses the raw legacy record.
pub fn parse_legacy_favorites(json: &str) -> Result<LegacyFavorites> {
    let favorites: LegacyFavorites = serde_json::from_str(json)?;
    for (key, favorite) in &favorites.favorites {
        if key.parse::<i64>().ok() != Some(favorite.item_id) {
            warn!(
                "Legacy favorite keyed '{}' carries item id {}",
                key, favorite.item_id
            );
        }
    }
    Ok(favorites)
}

impl LegacyFavorites {
    /// Favorites ordered oldest first, ties by item id.
    pub fn ordered(&self) -> Vec<LegacyFavorite> {
        let mut favorites: Vec<LegacyFavorite> = self.favorites.values().cloned().collect();
        favorites.sort_by(|a, b| {
            a.added_at
                .cmp(&b.added_at)
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        favorites
    }
}

/// Converts legacy favorites 1:1 into watchlist items, keeping their `added_at`.
pub fn favorites_to_items(favorites: &[LegacyFavorite]) -> Vec<WatchlistItem> {
    favorites
        .iter()
        .map(|favorite| WatchlistItem {
            item_id: favorite.item_id,
            name: favorite.name.clone(),
            icon_url: favorite.icon_url.clone(),
            added_at: favorite.added_at,
            notes: None,
        })
        .collect()
}
