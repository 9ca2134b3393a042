use chrono::Utc;
use log::{debug, error, info, warn};
use std::sync::{Arc, RwLock, RwLockReadGuard};

use super::import::{build_export, parse_import, prepare_import};
use super::state::{initial_state, new_watchlist, normalize_state};
use super::watchlists_errors::WatchlistError;
use super::watchlists_model::{
    NewWatchlistItem, Watchlist, WatchlistItem, WatchlistLimits, WatchlistState,
};
use super::watchlists_traits::{WatchlistRepositoryTrait, WatchlistServiceTrait};
use crate::errors::{Error, Result};
use crate::migration::{favorites_to_items, LegacyFavorite};

/// Outcome of a mutation closure: whether the record must be written through.
enum Change<T> {
    Applied(T),
    Unchanged(T),
}

/// The watchlist store.
///
/// Holds the whole record in memory and writes it through the repository after
/// every mutation that changed it. All mutations are serialized by the state lock.
pub struct WatchlistService {
    repository: Arc<dyn WatchlistRepositoryTrait>,
    limits: WatchlistLimits,
    state: RwLock<WatchlistState>,
}

impl WatchlistService {
    /// Loads the persisted record, repairing it if needed, or bootstraps a
    /// fresh one holding only the default watchlist.
    pub fn new(
        repository: Arc<dyn WatchlistRepositoryTrait>,
        limits: WatchlistLimits,
    ) -> Result<Self> {
        let now = Utc::now();
        let (state, dirty) = match repository.load_state()? {
            Some(loaded) => normalize_state(loaded, &limits, now)?,
            None => {
                info!("No watchlist record found, creating the default watchlist");
                (initial_state(now), true)
            }
        };

        let service = WatchlistService {
            repository,
            limits,
            state: RwLock::new(state),
        };
        if dirty {
            service.persist(&*service.read()?);
        }
        Ok(service)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, WatchlistState>> {
        self.state
            .read()
            .map_err(|_| Error::Unexpected("Watchlist state lock poisoned".to_string()))
    }

    /// Write-through. A failed save is logged and the in-memory change stands.
    fn persist(&self, state: &WatchlistState) {
        if let Err(e) = self.repository.save_state(state) {
            error!("Failed to persist watchlists: {}", e);
        }
    }

    /// Runs a mutation under the write lock. The closure must validate before it
    /// touches the state, so a rejected operation leaves the store unchanged.
    fn commit<T, F>(&self, operation: &str, mutation: F) -> Result<T>
    where
        F: FnOnce(&mut WatchlistState) -> std::result::Result<Change<T>, WatchlistError>,
    {
        let mut state = self
            .state
            .write()
            .map_err(|_| Error::Unexpected("Watchlist state lock poisoned".to_string()))?;

        match mutation(&mut *state) {
            Ok(Change::Applied(value)) => {
                debug!("{} applied", operation);
                self.persist(&state);
                Ok(value)
            }
            Ok(Change::Unchanged(value)) => Ok(value),
            Err(e) => {
                debug!("{} rejected: {}", operation, e);
                Err(e.into())
            }
        }
    }

    fn validated_name(&self, name: &str) -> std::result::Result<String, WatchlistError> {
        let trimmed = name.trim();
        if !self.limits.name_fits(trimmed) {
            return Err(WatchlistError::InvalidNameLength {
                min: self.limits.min_name_length,
                max: self.limits.max_name_length,
            });
        }
        Ok(trimmed.to_string())
    }

    fn validated_note(
        &self,
        notes: Option<&str>,
    ) -> std::result::Result<Option<String>, WatchlistError> {
        let trimmed = notes.map(str::trim).unwrap_or_default();
        if !self.limits.note_fits(trimmed) {
            return Err(WatchlistError::NoteTooLong(self.limits.max_note_length));
        }
        Ok(if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        })
    }
}

fn watchlist_mut<'a>(
    state: &'a mut WatchlistState,
    id: &str,
) -> std::result::Result<&'a mut Watchlist, WatchlistError> {
    state
        .watchlists
        .get_mut(id)
        .ok_or_else(|| WatchlistError::WatchlistNotFound(id.to_string()))
}

impl WatchlistServiceTrait for WatchlistService {
    fn limits(&self) -> WatchlistLimits {
        self.limits
    }

    fn create_watchlist(&self, name: &str) -> Result<String> {
        self.commit("create_watchlist", |state| {
            let name = self.validated_name(name)?;
            if state.name_taken(&name, None) {
                return Err(WatchlistError::DuplicateName(name));
            }
            if state.watchlists.len() >= self.limits.max_watchlists {
                return Err(WatchlistError::WatchlistLimitExceeded(
                    self.limits.max_watchlists,
                ));
            }

            let watchlist = new_watchlist(name, false, Utc::now());
            let id = watchlist.id.clone();
            state.watchlists.insert(id.clone(), watchlist);
            Ok(Change::Applied(id))
        })
    }

    fn delete_watchlist(&self, id: &str) -> Result<()> {
        self.commit("delete_watchlist", |state| {
            let watchlist = state
                .watchlists
                .get(id)
                .ok_or_else(|| WatchlistError::WatchlistNotFound(id.to_string()))?;
            if watchlist.is_default {
                return Err(WatchlistError::CannotModifyDefault);
            }

            state.watchlists.remove(id);
            if state.active_watchlist_id == id {
                if let Some(default_id) = state.default_watchlist_id() {
                    state.active_watchlist_id = default_id;
                }
            }
            Ok(Change::Applied(()))
        })
    }

    fn rename_watchlist(&self, id: &str, name: &str) -> Result<()> {
        self.commit("rename_watchlist", |state| {
            let watchlist = state
                .watchlists
                .get(id)
                .ok_or_else(|| WatchlistError::WatchlistNotFound(id.to_string()))?;
            if watchlist.is_default {
                return Err(WatchlistError::CannotModifyDefault);
            }
            let name = self.validated_name(name)?;
            if state.name_taken(&name, Some(id)) {
                return Err(WatchlistError::DuplicateName(name));
            }

            let watchlist = watchlist_mut(state, id)?;
            watchlist.name = name;
            watchlist.updated_at = Utc::now();
            Ok(Change::Applied(()))
        })
    }

    fn get_watchlist(&self, id: &str) -> Result<Option<Watchlist>> {
        Ok(self.read()?.watchlists.get(id).cloned())
    }

    fn get_all_watchlists(&self) -> Result<Vec<Watchlist>> {
        Ok(self.read()?.ordered().into_iter().cloned().collect())
    }

    fn get_watchlist_count(&self) -> Result<usize> {
        Ok(self.read()?.watchlists.len())
    }

    fn get_default_watchlist(&self) -> Result<Watchlist> {
        self.read()?
            .default_watchlist()
            .cloned()
            .ok_or_else(|| Error::Unexpected("Default watchlist missing".to_string()))
    }

    fn get_active_watchlist(&self) -> Result<Watchlist> {
        let state = self.read()?;
        state
            .watchlists
            .get(&state.active_watchlist_id)
            .or_else(|| state.default_watchlist())
            .cloned()
            .ok_or_else(|| Error::Unexpected("Default watchlist missing".to_string()))
    }

    fn set_active_watchlist(&self, id: &str) -> Result<()> {
        self.commit("set_active_watchlist", |state| {
            if !state.watchlists.contains_key(id) {
                return Err(WatchlistError::WatchlistNotFound(id.to_string()));
            }
            if state.active_watchlist_id == id {
                return Ok(Change::Unchanged(()));
            }
            state.active_watchlist_id = id.to_string();
            Ok(Change::Applied(()))
        })
    }

    fn add_item_to_watchlist(
        &self,
        watchlist_id: &str,
        item: NewWatchlistItem,
    ) -> Result<WatchlistItem> {
        self.commit("add_item_to_watchlist", |state| {
            let max_items = self.limits.max_items_per_watchlist;
            let watchlist = watchlist_mut(state, watchlist_id)?;
            if watchlist.contains_item(item.item_id) {
                return Err(WatchlistError::ItemAlreadyPresent(item.item_id));
            }
            if watchlist.items.len() >= max_items {
                return Err(WatchlistError::ItemLimitExceeded(max_items));
            }
            let notes = self.validated_note(item.notes.as_deref())?;

            let now = Utc::now();
            let added = WatchlistItem {
                item_id: item.item_id,
                name: item.name,
                icon_url: item.icon_url,
                added_at: now,
                notes,
            };
            watchlist.items.push(added.clone());
            watchlist.updated_at = now;
            Ok(Change::Applied(added))
        })
    }

    fn remove_item_from_watchlist(&self, watchlist_id: &str, item_id: i64) -> Result<()> {
        self.commit("remove_item_from_watchlist", |state| {
            let Some(watchlist) = state.watchlists.get_mut(watchlist_id) else {
                return Ok(Change::Unchanged(()));
            };
            let before = watchlist.items.len();
            watchlist.items.retain(|item| item.item_id != item_id);
            if watchlist.items.len() == before {
                return Ok(Change::Unchanged(()));
            }
            watchlist.updated_at = Utc::now();
            Ok(Change::Applied(()))
        })
    }

    fn move_item_between_watchlists(
        &self,
        from_id: &str,
        to_id: &str,
        item_id: i64,
    ) -> Result<()> {
        self.commit("move_item_between_watchlists", |state| {
            let max_items = self.limits.max_items_per_watchlist;
            let source = state
                .watchlists
                .get(from_id)
                .ok_or_else(|| WatchlistError::WatchlistNotFound(from_id.to_string()))?;
            let destination = state
                .watchlists
                .get(to_id)
                .ok_or_else(|| WatchlistError::WatchlistNotFound(to_id.to_string()))?;
            if !source.contains_item(item_id) {
                return Err(WatchlistError::ItemNotFound(item_id));
            }
            if destination.contains_item(item_id) {
                return Err(WatchlistError::ItemAlreadyPresent(item_id));
            }
            if destination.items.len() >= max_items {
                return Err(WatchlistError::ItemLimitExceeded(max_items));
            }

            // Every check passed; from here on both lists change.
            let now = Utc::now();
            let source = watchlist_mut(state, from_id)?;
            let position = source
                .items
                .iter()
                .position(|item| item.item_id == item_id)
                .ok_or(WatchlistError::ItemNotFound(item_id))?;
            let mut moved = source.items.remove(position);
            source.updated_at = now;

            moved.added_at = now;
            let destination = watchlist_mut(state, to_id)?;
            destination.items.push(moved);
            destination.updated_at = now;
            Ok(Change::Applied(()))
        })
    }

    fn is_item_in_watchlist(&self, watchlist_id: &str, item_id: i64) -> Result<bool> {
        Ok(self
            .read()?
            .watchlists
            .get(watchlist_id)
            .is_some_and(|w| w.contains_item(item_id)))
    }

    fn get_item_watchlists(&self, item_id: i64) -> Result<Vec<Watchlist>> {
        Ok(self
            .read()?
            .ordered()
            .into_iter()
            .filter(|w| w.contains_item(item_id))
            .cloned()
            .collect())
    }

    fn update_item_notes(
        &self,
        watchlist_id: &str,
        item_id: i64,
        notes: Option<&str>,
    ) -> Result<()> {
        self.commit("update_item_notes", |state| {
            let notes = {
                let watchlist = state
                    .watchlists
                    .get(watchlist_id)
                    .ok_or_else(|| WatchlistError::WatchlistNotFound(watchlist_id.to_string()))?;
                if !watchlist.contains_item(item_id) {
                    return Err(WatchlistError::ItemNotFound(item_id));
                }
                self.validated_note(notes)?
            };

            let watchlist = watchlist_mut(state, watchlist_id)?;
            if let Some(item) = watchlist.items.iter_mut().find(|i| i.item_id == item_id) {
                item.notes = notes;
            }
            watchlist.updated_at = Utc::now();
            Ok(Change::Applied(()))
        })
    }

    fn clear_watchlist(&self, id: &str) -> Result<()> {
        self.commit("clear_watchlist", |state| {
            match state.watchlists.get_mut(id) {
                Some(watchlist) if !watchlist.items.is_empty() => {
                    watchlist.items.clear();
                    watchlist.updated_at = Utc::now();
                    Ok(Change::Applied(()))
                }
                _ => Ok(Change::Unchanged(())),
            }
        })
    }

    fn export_watchlist(&self, id: &str) -> Result<Option<Watchlist>> {
        self.get_watchlist(id)
    }

    fn export_all_watchlists(&self) -> Result<Vec<Watchlist>> {
        self.get_all_watchlists()
    }

    fn export_all_watchlists_json(&self) -> Result<String> {
        let export = build_export(self.export_all_watchlists()?, Utc::now());
        Ok(serde_json::to_string_pretty(&export)?)
    }

    fn import_watchlist(&self, watchlist: &Watchlist) -> Result<String> {
        self.commit("import_watchlist", |state| {
            if state.watchlists.len() >= self.limits.max_watchlists {
                return Err(WatchlistError::WatchlistLimitExceeded(
                    self.limits.max_watchlists,
                ));
            }
            let copy = prepare_import(watchlist, state, &self.limits, Utc::now());
            let id = copy.id.clone();
            state.watchlists.insert(id.clone(), copy);
            Ok(Change::Applied(id))
        })
    }

    fn import_watchlists_json(&self, json: &str) -> Result<Vec<String>> {
        let watchlists = parse_import(json)?;
        let mut imported = Vec::with_capacity(watchlists.len());
        for watchlist in &watchlists {
            match self.import_watchlist(watchlist) {
                Ok(id) => imported.push(id),
                Err(Error::Watchlist(WatchlistError::WatchlistLimitExceeded(max))) => {
                    warn!(
                        "Watchlist limit of {} reached, skipped {} of {} imported watchlists",
                        max,
                        watchlists.len() - imported.len(),
                        watchlists.len()
                    );
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(imported)
    }

    fn migrate_from_favorites(&self, favorites: &[LegacyFavorite]) -> Result<usize> {
        self.commit("migrate_from_favorites", |state| {
            if state.migrated {
                return Ok(Change::Unchanged(0));
            }
            let default_id = state.default_watchlist_id().ok_or_else(|| {
                WatchlistError::WatchlistNotFound("default".to_string())
            })?;

            let max_items = self.limits.max_items_per_watchlist;
            let default = watchlist_mut(state, &default_id)?;
            let mut appended = 0;
            for (index, item) in favorites_to_items(favorites).into_iter().enumerate() {
                if default.contains_item(item.item_id) {
                    continue;
                }
                if default.items.len() >= max_items {
                    warn!(
                        "Default watchlist is full, {} legacy favorites were not migrated",
                        favorites.len() - index
                    );
                    break;
                }
                default.items.push(item);
                appended += 1;
            }
            if appended > 0 {
                default.updated_at = Utc::now();
            }

            state.migrated = true;
            info!("Migrated {} legacy favorites into the default watchlist", appended);
            Ok(Change::Applied(appended))
        })
    }

    fn is_migrated(&self) -> Result<bool> {
        Ok(self.read()?.migrated)
    }
}
