//! Construction and repair of the persisted watchlist record.

use chrono::{DateTime, Utc};
use log::{info, warn};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::constants::{CURRENT_SCHEMA_VERSION, DEFAULT_WATCHLIST_NAME};
use crate::errors::{Error, Result};

use super::import::{sanitize_items, unique_name};
use super::watchlists_model::{Watchlist, WatchlistLimits, WatchlistState};

pub(crate) fn new_watchlist_id() -> String {
    Uuid::now_v7().to_string()
}

pub(crate) fn new_watchlist(name: String, is_default: bool, now: DateTime<Utc>) -> Watchlist {
    Watchlist {
        id: new_watchlist_id(),
        name,
        items: Vec::new(),
        created_at: now,
        updated_at: now,
        is_default,
    }
}

/// Fresh record for a first run: only the default watchlist, active and not migrated.
pub(crate) fn initial_state(now: DateTime<Utc>) -> WatchlistState {
    let default = new_watchlist(DEFAULT_WATCHLIST_NAME.to_string(), true, now);
    let mut state = WatchlistState {
        active_watchlist_id: default.id.clone(),
        ..WatchlistState::default()
    };
    state.watchlists.insert(default.id.clone(), default);
    state
}

/// Brings a loaded record up to the current schema and restores the
/// store invariants. Returns the record and whether anything changed.
pub(crate) fn normalize_state(
    mut state: WatchlistState,
    limits: &WatchlistLimits,
    now: DateTime<Utc>,
) -> Result<(WatchlistState, bool)> {
    if state.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(Error::Repository(format!(
            "Watchlist record uses schema version {} but only {} is supported",
            state.schema_version, CURRENT_SCHEMA_VERSION
        )));
    }

    let mut changed = false;

    if state.schema_version < CURRENT_SCHEMA_VERSION {
        info!(
            "Upgrading watchlist record from schema {} to {}",
            state.schema_version, CURRENT_SCHEMA_VERSION
        );
        state.schema_version = CURRENT_SCHEMA_VERSION;
        changed = true;
    }

    if state.watchlists.iter().any(|(key, w)| key != &w.id) {
        warn!("Watchlist record keys out of sync with ids, re-keying");
        state.watchlists = state
            .watchlists
            .into_values()
            .map(|w| (w.id.clone(), w))
            .collect::<HashMap<_, _>>();
        changed = true;
    }

    changed |= repair_default(&mut state, now);
    changed |= repair_contents(&mut state, limits);

    if state.watchlists.len() > limits.max_watchlists {
        warn!(
            "Watchlist record holds {} lists, over the limit of {}",
            state.watchlists.len(),
            limits.max_watchlists
        );
    }

    if !state.watchlists.contains_key(&state.active_watchlist_id) {
        if let Some(default_id) = state.default_watchlist_id() {
            state.active_watchlist_id = default_id;
            changed = true;
        }
    }

    Ok((state, changed))
}

/// Ensures exactly one default watchlist exists.
fn repair_default(state: &mut WatchlistState, now: DateTime<Utc>) -> bool {
    let mut defaults: Vec<(DateTime<Utc>, String)> = state
        .watchlists
        .values()
        .filter(|w| w.is_default)
        .map(|w| (w.created_at, w.id.clone()))
        .collect();

    match defaults.len() {
        1 => false,
        0 => {
            // Promote a list already carrying the default name, otherwise create one.
            let existing = state
                .watchlists
                .values_mut()
                .find(|w| w.has_name(DEFAULT_WATCHLIST_NAME));
            match existing {
                Some(watchlist) => {
                    warn!("No default watchlist found, promoting '{}'", watchlist.name);
                    watchlist.is_default = true;
                }
                None => {
                    warn!("No default watchlist found, creating one");
                    let default = new_watchlist(DEFAULT_WATCHLIST_NAME.to_string(), true, now);
                    state.watchlists.insert(default.id.clone(), default);
                }
            }
            true
        }
        _ => {
            warn!(
                "Found {} default watchlists, keeping the oldest",
                defaults.len()
            );
            defaults.sort();
            for (_, id) in defaults.into_iter().skip(1) {
                if let Some(watchlist) = state.watchlists.get_mut(&id) {
                    watchlist.is_default = false;
                }
            }
            true
        }
    }
}

/// Names unique and in bounds, items unique and capped, notes in bounds.
/// The default list claims its name first, then lists in creation order.
fn repair_contents(state: &mut WatchlistState, limits: &WatchlistLimits) -> bool {
    let mut order: Vec<(bool, DateTime<Utc>, String)> = state
        .watchlists
        .values()
        .map(|w| (!w.is_default, w.created_at, w.id.clone()))
        .collect();
    order.sort();

    let mut changed = false;
    let mut taken: HashSet<String> = HashSet::new();
    for (_, _, id) in order {
        let Some(watchlist) = state.watchlists.get_mut(&id) else {
            continue;
        };

        let name = unique_name(&watchlist.name, limits, |candidate| {
            taken.contains(&candidate.to_lowercase())
        });
        if name != watchlist.name {
            warn!("Renaming stored watchlist '{}' to '{}'", watchlist.name, name);
            watchlist.name = name;
            changed = true;
        }
        taken.insert(watchlist.name.to_lowercase());

        let items = sanitize_items(&watchlist.items, limits);
        if items != watchlist.items {
            warn!(
                "Repaired items of stored watchlist '{}' ({} -> {})",
                watchlist.name,
                watchlist.items.len(),
                items.len()
            );
            watchlist.items = items;
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn initial_state_has_single_active_default() {
        let now = Utc::now();
        let state = initial_state(now);
        assert_eq!(state.watchlists.len(), 1);
        let default = state.default_watchlist().unwrap();
        assert_eq!(default.name, DEFAULT_WATCHLIST_NAME);
        assert_eq!(state.active_watchlist_id, default.id);
        assert!(!state.migrated);
        assert_eq!(state.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn rejects_newer_schema() {
        let mut state = initial_state(Utc::now());
        state.schema_version = CURRENT_SCHEMA_VERSION + 1;
        assert!(matches!(
            normalize_state(state, &WatchlistLimits::default(), Utc::now()),
            Err(Error::Repository(_))
        ));
    }

    #[test]
    fn upgrades_old_schema_and_fixes_dangling_active_id() {
        let mut state = initial_state(Utc::now());
        state.schema_version = 1;
        state.active_watchlist_id = "gone".to_string();
        let default_id = state.default_watchlist_id().unwrap();

        let (state, changed) =
            normalize_state(state, &WatchlistLimits::default(), Utc::now()).unwrap();
        assert!(changed);
        assert_eq!(state.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(state.active_watchlist_id, default_id);
    }

    #[test]
    fn keeps_oldest_of_multiple_defaults() {
        let now = Utc::now();
        let mut state = initial_state(now);
        let older_id = state.default_watchlist_id().unwrap();
        let newer = new_watchlist("Second".to_string(), true, now + Duration::seconds(5));
        state.watchlists.insert(newer.id.clone(), newer);

        let (state, changed) =
            normalize_state(state, &WatchlistLimits::default(), now).unwrap();
        assert!(changed);
        let defaults: Vec<_> = state.watchlists.values().filter(|w| w.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, older_id);
    }

    #[test]
    fn creates_default_when_missing() {
        let now = Utc::now();
        let custom = new_watchlist("Skilling".to_string(), false, now);
        let mut state = WatchlistState {
            active_watchlist_id: custom.id.clone(),
            ..WatchlistState::default()
        };
        state.watchlists.insert(custom.id.clone(), custom);

        let (state, changed) =
            normalize_state(state, &WatchlistLimits::default(), now).unwrap();
        assert!(changed);
        assert_eq!(state.watchlists.len(), 2);
        assert_eq!(
            state.default_watchlist().unwrap().name,
            DEFAULT_WATCHLIST_NAME
        );
    }

    #[test]
    fn untouched_record_reports_no_change() {
        let state = initial_state(Utc::now());
        let (normalized, changed) =
            normalize_state(state.clone(), &WatchlistLimits::default(), Utc::now()).unwrap();
        assert!(!changed);
        assert_eq!(normalized, state);
    }

    #[test]
    fn repairs_duplicate_names_and_items() {
        let now = Utc::now();
        let limits = WatchlistLimits {
            max_items_per_watchlist: 2,
            ..WatchlistLimits::default()
        };
        let mut state = initial_state(now);
        let older = new_watchlist("Herbs".to_string(), false, now);
        let mut newer =
            new_watchlist("  HERBS ".to_string(), false, now + Duration::seconds(5));
        let item = |item_id: i64| crate::watchlists::WatchlistItem {
            item_id,
            name: format!("Item {}", item_id),
            icon_url: String::new(),
            added_at: now,
            notes: None,
        };
        newer.items = vec![item(1), item(1), item(2), item(3)];
        let older_id = older.id.clone();
        let newer_id = newer.id.clone();
        state.watchlists.insert(older.id.clone(), older);
        state.watchlists.insert(newer.id.clone(), newer);

        let (state, changed) = normalize_state(state, &limits, now).unwrap();
        assert!(changed);
        assert_eq!(state.watchlists[&older_id].name, "Herbs");
        let repaired = &state.watchlists[&newer_id];
        assert_eq!(repaired.name, "HERBS (2)");
        let ids: Vec<i64> = repaired.items.iter().map(|i| i.item_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn default_keeps_its_name_over_a_clashing_list() {
        let now = Utc::now();
        let mut state = initial_state(now);
        let default_id = state.default_watchlist_id().unwrap();
        let clash = new_watchlist(
            DEFAULT_WATCHLIST_NAME.to_uppercase(),
            false,
            now - Duration::seconds(30),
        );
        let clash_id = clash.id.clone();
        state.watchlists.insert(clash.id.clone(), clash);

        let (state, _) = normalize_state(state, &WatchlistLimits::default(), now).unwrap();
        assert_eq!(state.watchlists[&default_id].name, DEFAULT_WATCHLIST_NAME);
        assert_ne!(
            state.watchlists[&clash_id].name.to_lowercase(),
            DEFAULT_WATCHLIST_NAME.to_lowercase()
        );
    }

    #[test]
    fn lists_over_a_lowered_limit_are_kept() {
        let now = Utc::now();
        let mut state = initial_state(now);
        for name in ["Ores", "Bars", "Logs"] {
            let list = new_watchlist(name.to_string(), false, now);
            state.watchlists.insert(list.id.clone(), list);
        }
        let limits = WatchlistLimits {
            max_watchlists: 2,
            ..WatchlistLimits::default()
        };

        let (state, changed) = normalize_state(state, &limits, now).unwrap();
        assert!(!changed);
        assert_eq!(state.watchlists.len(), 4);
    }
}
