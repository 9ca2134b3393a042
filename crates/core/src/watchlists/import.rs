//! Bulk import/export of watchlists.
//!
//! Imported data comes from files and share links, so it is normalized here
//! before it reaches the store: names stay unique and within bounds, items stay
//! unique and within the per-list limit, notes stay within the note limit.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;

use crate::constants::{EXPORT_FORMAT_VERSION, IMPORTED_WATCHLIST_NAME};
use crate::errors::{Result, ValidationError};

use super::state::new_watchlist_id;
use super::watchlists_model::{
    Watchlist, WatchlistExport, WatchlistItem, WatchlistLimits, WatchlistState,
};

/// Accepted shapes for a bulk import: the export envelope or a bare list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportPayload {
    Envelope(WatchlistExport),
    Bare(Vec<Watchlist>),
}

pub(crate) fn build_export(watchlists: Vec<Watchlist>, now: DateTime<Utc>) -> WatchlistExport {
    WatchlistExport {
        version: EXPORT_FORMAT_VERSION,
        exported_at: now,
        watchlists,
    }
}

/// Parses a bulk import payload, rejecting unknown envelope versions.
pub(crate) fn parse_import(json: &str) -> Result<Vec<Watchlist>> {
    match serde_json::from_str::<ImportPayload>(json)? {
        ImportPayload::Envelope(export) => {
            if export.version != EXPORT_FORMAT_VERSION {
                return Err(ValidationError::UnsupportedVersion(export.version).into());
            }
            Ok(export.watchlists)
        }
        ImportPayload::Bare(watchlists) => Ok(watchlists),
    }
}

/// Builds the copy that gets inserted for an imported watchlist.
///
/// The copy always gets a new id, `is_default = false` and fresh timestamps.
/// Item `added_at` values are kept as they are.
pub(crate) fn prepare_import(
    source: &Watchlist,
    state: &WatchlistState,
    limits: &WatchlistLimits,
    now: DateTime<Utc>,
) -> Watchlist {
    Watchlist {
        id: new_watchlist_id(),
        name: unique_name(&source.name, limits, |candidate| {
            state.name_taken(candidate, None)
        }),
        items: sanitize_items(&source.items, limits),
        created_at: now,
        updated_at: now,
        is_default: false,
    }
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect::<String>().trim_end().to_string()
}

/// Trims and bounds `name`, then suffixes `" (2)"`, `" (3)"`, ... until `is_taken` says no.
pub(crate) fn unique_name(
    name: &str,
    limits: &WatchlistLimits,
    is_taken: impl Fn(&str) -> bool,
) -> String {
    let mut base = truncate_chars(name.trim(), limits.max_name_length);
    if base.chars().count() < limits.min_name_length {
        base = truncate_chars(IMPORTED_WATCHLIST_NAME, limits.max_name_length);
    }
    if !is_taken(&base) {
        return base;
    }

    let mut counter = 2;
    loop {
        let suffix = format!(" ({})", counter);
        let room = limits
            .max_name_length
            .saturating_sub(suffix.chars().count());
        let candidate = format!("{}{}", truncate_chars(&base, room), suffix);
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

pub(crate) fn sanitize_items(items: &[WatchlistItem], limits: &WatchlistLimits) -> Vec<WatchlistItem> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(item.item_id))
        .take(limits.max_items_per_watchlist)
        .map(|item| WatchlistItem {
            notes: item
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|note| !note.is_empty())
                .map(|note| truncate_chars(note, limits.max_note_length)),
            ..item.clone()
        })
        .collect()
}
