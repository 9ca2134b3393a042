//! Migration from the legacy single-list ("favorites") format.

mod favorites_migration;
mod legacy_model;

pub use favorites_migration::{favorites_to_items, parse_legacy_favorites};
pub use legacy_model::{LegacyFavorite, LegacyFavorites, LegacyFavoritesRepositoryTrait};
