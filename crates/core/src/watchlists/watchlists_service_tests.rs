#[cfg(test)]
mod tests {
    use crate::constants::{DEFAULT_WATCHLIST_NAME, MAX_NOTE_LENGTH};
    use crate::errors::{Error, Result};
    use crate::migration::LegacyFavorite;
    use crate::watchlists::{
        NewWatchlistItem, Watchlist, WatchlistError, WatchlistLimits, WatchlistRepositoryTrait,
        WatchlistService, WatchlistServiceTrait, WatchlistState,
    };
    use chrono::{TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    // --- Mock WatchlistRepository ---
    #[derive(Clone, Default)]
    struct MockWatchlistRepository {
        state: Arc<Mutex<Option<WatchlistState>>>,
        saves: Arc<Mutex<usize>>,
        fail_saves: bool,
    }

    impl MockWatchlistRepository {
        fn failing() -> Self {
            Self {
                fail_saves: true,
                ..Self::default()
            }
        }

        fn save_count(&self) -> usize {
            *self.saves.lock().unwrap()
        }

        fn saved_state(&self) -> Option<WatchlistState> {
            self.state.lock().unwrap().clone()
        }
    }

    impl WatchlistRepositoryTrait for MockWatchlistRepository {
        fn load_state(&self) -> Result<Option<WatchlistState>> {
            Ok(self.state.lock().unwrap().clone())
        }

        fn save_state(&self, state: &WatchlistState) -> Result<()> {
            if self.fail_saves {
                return Err(Error::Repository("disk full".to_string()));
            }
            *self.saves.lock().unwrap() += 1;
            *self.state.lock().unwrap() = Some(state.clone());
            Ok(())
        }
    }

    fn store_with(repo: &MockWatchlistRepository, limits: WatchlistLimits) -> WatchlistService {
        WatchlistService::new(Arc::new(repo.clone()), limits).unwrap()
    }

    fn store() -> (WatchlistService, MockWatchlistRepository) {
        let repo = MockWatchlistRepository::default();
        (store_with(&repo, WatchlistLimits::default()), repo)
    }

    fn item(item_id: i64) -> NewWatchlistItem {
        NewWatchlistItem {
            item_id,
            name: format!("Item {}", item_id),
            icon_url: format!("https://cdn.example/icons/{}.png", item_id),
            notes: None,
        }
    }

    fn favorite(item_id: i64, day: u32) -> LegacyFavorite {
        LegacyFavorite {
            item_id,
            name: format!("Favorite {}", item_id),
            icon_url: format!("https://cdn.example/icons/{}.png", item_id),
            added_at: Utc.with_ymd_and_hms(2020, 1, day, 12, 0, 0).unwrap(),
        }
    }

    fn rejection<T: std::fmt::Debug>(result: Result<T>) -> WatchlistError {
        match result {
            Err(Error::Watchlist(e)) => e,
            other => panic!("expected a watchlist rejection, got {:?}", other),
        }
    }

    fn default_id(store: &WatchlistService) -> String {
        store.get_default_watchlist().unwrap().id
    }

    fn item_ids(store: &WatchlistService, id: &str) -> Vec<i64> {
        store
            .get_watchlist(id)
            .unwrap()
            .unwrap()
            .items
            .iter()
            .map(|i| i.item_id)
            .collect()
    }

    // --- Bootstrap and persistence ---

    #[test]
    fn first_run_creates_and_persists_default() {
        let (store, repo) = store();
        let all = store.get_all_watchlists().unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_default);
        assert_eq!(all[0].name, DEFAULT_WATCHLIST_NAME);
        assert_eq!(store.get_active_watchlist().unwrap().id, all[0].id);
        assert_eq!(repo.save_count(), 1);
        assert!(!store.is_migrated().unwrap());
    }

    #[test]
    fn reopening_reads_persisted_record_without_rewriting() {
        let (store, repo) = store();
        let id = store.create_watchlist("Herblore").unwrap();
        store.add_item_to_watchlist(&id, item(257)).unwrap();
        let saves = repo.save_count();

        let reopened = store_with(&repo, WatchlistLimits::default());
        assert_eq!(reopened.get_watchlist_count().unwrap(), 2);
        assert_eq!(item_ids(&reopened, &id), vec![257]);
        assert_eq!(repo.save_count(), saves);
    }

    #[test]
    fn failed_save_keeps_in_memory_change() {
        let repo = MockWatchlistRepository::failing();
        let store = store_with(&repo, WatchlistLimits::default());
        let id = store.create_watchlist("Runes").unwrap();
        assert!(store.get_watchlist(&id).unwrap().is_some());
        assert!(repo.saved_state().is_none());
    }

    #[test]
    fn rejected_operations_do_not_write() {
        let (store, repo) = store();
        let saves = repo.save_count();
        let default = default_id(&store);
        assert!(store.delete_watchlist(&default).is_err());
        assert!(store.create_watchlist("   ").is_err());
        store.remove_item_from_watchlist(&default, 42).unwrap();
        store.clear_watchlist("missing").unwrap();
        assert_eq!(repo.save_count(), saves);
    }

    // --- Create / rename / delete ---

    #[test]
    fn create_trims_name_and_lists_it() {
        let (store, _) = store();
        let id = store.create_watchlist("  PvM Gear  ").unwrap();
        let created = store.get_watchlist(&id).unwrap().unwrap();
        assert_eq!(created.name, "PvM Gear");
        assert!(!created.is_default);
        assert!(created.items.is_empty());
        assert_eq!(created.created_at, created.updated_at);
        assert!(store
            .get_all_watchlists()
            .unwrap()
            .iter()
            .any(|w| w.name == "PvM Gear"));
    }

    #[test]
    fn create_rejects_case_insensitive_duplicate() {
        let (store, _) = store();
        store.create_watchlist("PvM Gear").unwrap();
        assert_eq!(
            rejection(store.create_watchlist("pvm gear")),
            WatchlistError::DuplicateName("pvm gear".to_string())
        );
        assert!(matches!(
            rejection(store.create_watchlist(&DEFAULT_WATCHLIST_NAME.to_uppercase())),
            WatchlistError::DuplicateName(_)
        ));
    }

    #[test]
    fn create_enforces_name_length() {
        let (store, _) = store();
        assert!(matches!(
            rejection(store.create_watchlist("")),
            WatchlistError::InvalidNameLength { .. }
        ));
        assert!(matches!(
            rejection(store.create_watchlist(&"a".repeat(51))),
            WatchlistError::InvalidNameLength { .. }
        ));
        assert!(store.create_watchlist(&"a".repeat(50)).is_ok());
        assert!(store.create_watchlist("b").is_ok());
    }

    #[test]
    fn create_stops_at_watchlist_limit() {
        let repo = MockWatchlistRepository::default();
        let limits = WatchlistLimits {
            max_watchlists: 3,
            ..WatchlistLimits::default()
        };
        let store = store_with(&repo, limits);
        store.create_watchlist("One").unwrap();
        store.create_watchlist("Two").unwrap();
        assert_eq!(
            rejection(store.create_watchlist("Three")),
            WatchlistError::WatchlistLimitExceeded(3)
        );
        assert_eq!(store.get_watchlist_count().unwrap(), 3);
    }

    #[test]
    fn default_cannot_be_deleted_or_renamed() {
        let (store, _) = store();
        let default = default_id(&store);
        assert_eq!(
            rejection(store.delete_watchlist(&default)),
            WatchlistError::CannotModifyDefault
        );
        assert_eq!(
            rejection(store.rename_watchlist(&default, "Renamed")),
            WatchlistError::CannotModifyDefault
        );
        assert_eq!(
            store.get_default_watchlist().unwrap().name,
            DEFAULT_WATCHLIST_NAME
        );
    }

    #[test]
    fn deleting_active_watchlist_reverts_to_default() {
        let (store, _) = store();
        let id = store.create_watchlist("Flips").unwrap();
        store.set_active_watchlist(&id).unwrap();
        assert_eq!(store.get_active_watchlist().unwrap().id, id);

        store.delete_watchlist(&id).unwrap();
        assert!(store.get_watchlist(&id).unwrap().is_none());
        assert_eq!(store.get_active_watchlist().unwrap().id, default_id(&store));
        assert!(matches!(
            rejection(store.delete_watchlist(&id)),
            WatchlistError::WatchlistNotFound(_)
        ));
    }

    #[test]
    fn set_active_rejects_unknown_id() {
        let (store, _) = store();
        assert!(matches!(
            rejection(store.set_active_watchlist("nope")),
            WatchlistError::WatchlistNotFound(_)
        ));
    }

    #[test]
    fn rename_checks_collisions_against_other_lists_only() {
        let (store, _) = store();
        let a = store.create_watchlist("Logs").unwrap();
        store.create_watchlist("Planks").unwrap();

        assert!(matches!(
            rejection(store.rename_watchlist(&a, "PLANKS")),
            WatchlistError::DuplicateName(_)
        ));
        store.rename_watchlist(&a, "LOGS").unwrap();
        assert_eq!(store.get_watchlist(&a).unwrap().unwrap().name, "LOGS");
        assert!(matches!(
            rejection(store.rename_watchlist(&a, " ")),
            WatchlistError::InvalidNameLength { .. }
        ));
        assert!(matches!(
            rejection(store.rename_watchlist("missing", "Anything")),
            WatchlistError::WatchlistNotFound(_)
        ));
    }

    #[test]
    fn all_watchlists_default_first_then_newest() {
        let (store, _) = store();
        let first = store.create_watchlist("First").unwrap();
        let second = store.create_watchlist("Second").unwrap();
        let third = store.create_watchlist("Third").unwrap();

        let ids: Vec<String> = store
            .get_all_watchlists()
            .unwrap()
            .into_iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(ids, vec![default_id(&store), third, second, first]);
    }

    // --- Items ---

    #[test]
    fn adding_same_item_twice_is_rejected() {
        let (store, _) = store();
        let default = default_id(&store);
        let added = store.add_item_to_watchlist(&default, item(4151)).unwrap();
        assert_eq!(added.item_id, 4151);

        assert_eq!(
            rejection(store.add_item_to_watchlist(&default, item(4151))),
            WatchlistError::ItemAlreadyPresent(4151)
        );
        assert_eq!(item_ids(&store, &default), vec![4151]);
        assert!(store.is_item_in_watchlist(&default, 4151).unwrap());
        assert!(!store.is_item_in_watchlist(&default, 1).unwrap());
        assert!(!store.is_item_in_watchlist("missing", 4151).unwrap());
    }

    #[test]
    fn add_item_enforces_item_limit_and_note_length() {
        let repo = MockWatchlistRepository::default();
        let limits = WatchlistLimits {
            max_items_per_watchlist: 2,
            ..WatchlistLimits::default()
        };
        let store = store_with(&repo, limits);
        let default = default_id(&store);
        store.add_item_to_watchlist(&default, item(1)).unwrap();
        store.add_item_to_watchlist(&default, item(2)).unwrap();
        assert_eq!(
            rejection(store.add_item_to_watchlist(&default, item(3))),
            WatchlistError::ItemLimitExceeded(2)
        );

        let id = store.create_watchlist("Notes").unwrap();
        let mut noted = item(9);
        noted.notes = Some("x".repeat(MAX_NOTE_LENGTH + 1));
        assert_eq!(
            rejection(store.add_item_to_watchlist(&id, noted)),
            WatchlistError::NoteTooLong(MAX_NOTE_LENGTH)
        );
        assert!(matches!(
            rejection(store.add_item_to_watchlist("missing", item(1))),
            WatchlistError::WatchlistNotFound(_)
        ));
    }

    #[test]
    fn remove_item_is_a_noop_when_absent() {
        let (store, _) = store();
        let default = default_id(&store);
        store.add_item_to_watchlist(&default, item(1)).unwrap();
        store.add_item_to_watchlist(&default, item(2)).unwrap();

        store.remove_item_from_watchlist(&default, 1).unwrap();
        store.remove_item_from_watchlist(&default, 1).unwrap();
        store.remove_item_from_watchlist("missing", 2).unwrap();
        assert_eq!(item_ids(&store, &default), vec![2]);
    }

    #[test]
    fn move_item_restamps_added_at() {
        let (store, _) = store();
        let default = default_id(&store);
        store.migrate_from_favorites(&[favorite(7, 3)]).unwrap();
        let target = store.create_watchlist("Target").unwrap();

        store.move_item_between_watchlists(&default, &target, 7).unwrap();
        assert!(item_ids(&store, &default).is_empty());
        let moved = store.get_watchlist(&target).unwrap().unwrap().items[0].clone();
        assert_eq!(moved.item_id, 7);
        assert!(moved.added_at > favorite(7, 3).added_at);
    }

    #[test]
    fn move_item_fails_without_partial_mutation_when_destination_has_it() {
        let (store, _) = store();
        let default = default_id(&store);
        let b = store.create_watchlist("B").unwrap();
        store.add_item_to_watchlist(&default, item(7)).unwrap();
        store.add_item_to_watchlist(&b, item(7)).unwrap();
        let before: Vec<Watchlist> = store.get_all_watchlists().unwrap();

        assert_eq!(
            rejection(store.move_item_between_watchlists(&default, &b, 7)),
            WatchlistError::ItemAlreadyPresent(7)
        );
        assert_eq!(store.get_all_watchlists().unwrap(), before);
        assert!(store.is_item_in_watchlist(&default, 7).unwrap());
    }

    #[test]
    fn move_item_other_failures_leave_both_lists_untouched() {
        let repo = MockWatchlistRepository::default();
        let limits = WatchlistLimits {
            max_items_per_watchlist: 1,
            ..WatchlistLimits::default()
        };
        let store = store_with(&repo, limits);
        let default = default_id(&store);
        let full = store.create_watchlist("Full").unwrap();
        store.add_item_to_watchlist(&default, item(1)).unwrap();
        store.add_item_to_watchlist(&full, item(2)).unwrap();
        let before = store.get_all_watchlists().unwrap();

        assert_eq!(
            rejection(store.move_item_between_watchlists(&default, &full, 1)),
            WatchlistError::ItemLimitExceeded(1)
        );
        assert_eq!(
            rejection(store.move_item_between_watchlists(&default, &full, 99)),
            WatchlistError::ItemNotFound(99)
        );
        assert!(matches!(
            rejection(store.move_item_between_watchlists(&default, "missing", 1)),
            WatchlistError::WatchlistNotFound(_)
        ));
        assert!(matches!(
            rejection(store.move_item_between_watchlists("missing", &full, 2)),
            WatchlistError::WatchlistNotFound(_)
        ));
        assert_eq!(store.get_all_watchlists().unwrap(), before);
    }

    #[test]
    fn item_watchlists_lists_every_container() {
        let (store, _) = store();
        let default = default_id(&store);
        let a = store.create_watchlist("A").unwrap();
        let b = store.create_watchlist("B").unwrap();
        store.add_item_to_watchlist(&default, item(5)).unwrap();
        store.add_item_to_watchlist(&b, item(5)).unwrap();
        store.add_item_to_watchlist(&a, item(6)).unwrap();

        let mut ids: Vec<String> = store
            .get_item_watchlists(5)
            .unwrap()
            .into_iter()
            .map(|w| w.id)
            .collect();
        ids.sort();
        let mut expected = vec![default, b];
        expected.sort();
        assert_eq!(ids, expected);
        assert!(store.get_item_watchlists(404).unwrap().is_empty());
    }

    #[test]
    fn over_long_note_is_rejected_and_previous_note_kept() {
        let (store, _) = store();
        let id = store.create_watchlist("Notes").unwrap();
        store.add_item_to_watchlist(&id, item(3)).unwrap();
        store.update_item_notes(&id, 3, Some("  sell at 2m  ")).unwrap();

        assert_eq!(
            rejection(store.update_item_notes(&id, 3, Some(&"a".repeat(300)))),
            WatchlistError::NoteTooLong(MAX_NOTE_LENGTH)
        );
        let stored = store.get_watchlist(&id).unwrap().unwrap().items[0].clone();
        assert_eq!(stored.notes.as_deref(), Some("sell at 2m"));
    }

    #[test]
    fn blank_note_clears_and_unknown_targets_are_rejected() {
        let (store, _) = store();
        let id = store.create_watchlist("Notes").unwrap();
        store.add_item_to_watchlist(&id, item(3)).unwrap();
        store.update_item_notes(&id, 3, Some("keep")).unwrap();
        store.update_item_notes(&id, 3, Some("   ")).unwrap();
        assert_eq!(store.get_watchlist(&id).unwrap().unwrap().items[0].notes, None);

        let padded = format!("  {}  ", "n".repeat(MAX_NOTE_LENGTH));
        store.update_item_notes(&id, 3, Some(&padded)).unwrap();

        assert_eq!(
            rejection(store.update_item_notes(&id, 4, Some("x"))),
            WatchlistError::ItemNotFound(4)
        );
        assert!(matches!(
            rejection(store.update_item_notes("missing", 3, Some("x"))),
            WatchlistError::WatchlistNotFound(_)
        ));
    }

    #[test]
    fn clear_empties_items() {
        let (store, _) = store();
        let id = store.create_watchlist("Temp").unwrap();
        store.add_item_to_watchlist(&id, item(1)).unwrap();
        store.add_item_to_watchlist(&id, item(2)).unwrap();
        store.clear_watchlist(&id).unwrap();
        assert!(item_ids(&store, &id).is_empty());
    }

    // --- Import / export ---

    #[test]
    fn import_assigns_new_id_and_never_default() {
        let (store, _) = store();
        let default = default_id(&store);
        store.migrate_from_favorites(&[favorite(11, 2)]).unwrap();
        let source = store.export_watchlist(&default).unwrap().unwrap();

        let id = store.import_watchlist(&source).unwrap();
        assert_ne!(id, source.id);
        let imported = store.get_watchlist(&id).unwrap().unwrap();
        assert!(!imported.is_default);
        assert_eq!(imported.name, format!("{} (2)", DEFAULT_WATCHLIST_NAME));
        assert_eq!(imported.items, source.items);
        assert_eq!(imported.created_at, imported.updated_at);
        assert!(imported.created_at >= source.created_at);
        assert_eq!(
            store
                .get_all_watchlists()
                .unwrap()
                .iter()
                .filter(|w| w.is_default)
                .count(),
            1
        );
    }

    #[test]
    fn import_fails_at_capacity() {
        let repo = MockWatchlistRepository::default();
        let limits = WatchlistLimits {
            max_watchlists: 2,
            ..WatchlistLimits::default()
        };
        let store = store_with(&repo, limits);
        let id = store.create_watchlist("Only").unwrap();
        let source = store.export_watchlist(&id).unwrap().unwrap();
        assert_eq!(
            rejection(store.import_watchlist(&source)),
            WatchlistError::WatchlistLimitExceeded(2)
        );
    }

    #[test]
    fn json_export_imports_into_another_store() {
        let (source_store, _) = store();
        let id = source_store.create_watchlist("Bones").unwrap();
        source_store.add_item_to_watchlist(&id, item(536)).unwrap();
        let json = source_store.export_all_watchlists_json().unwrap();

        let (target, _) = store();
        let imported = target.import_watchlists_json(&json).unwrap();
        assert_eq!(imported.len(), 2);
        assert_eq!(target.get_watchlist_count().unwrap(), 3);
        let bones = target
            .get_all_watchlists()
            .unwrap()
            .into_iter()
            .find(|w| w.name == "Bones")
            .unwrap();
        assert_eq!(bones.items[0].item_id, 536);
    }

    #[test]
    fn json_import_stops_at_capacity() {
        let (source_store, _) = store();
        source_store.create_watchlist("A").unwrap();
        source_store.create_watchlist("B").unwrap();
        let json = source_store.export_all_watchlists_json().unwrap();

        let repo = MockWatchlistRepository::default();
        let limits = WatchlistLimits {
            max_watchlists: 2,
            ..WatchlistLimits::default()
        };
        let target = store_with(&repo, limits);
        assert_eq!(target.import_watchlists_json(&json).unwrap().len(), 1);
        assert!(target.import_watchlists_json("[oops").is_err());
    }

    // --- Migration ---

    #[test]
    fn migration_runs_once() {
        let (store, _) = store();
        let default = default_id(&store);

        let appended = store
            .migrate_from_favorites(&[favorite(2, 5), favorite(1, 4)])
            .unwrap();
        assert_eq!(appended, 2);
        assert_eq!(item_ids(&store, &default), vec![2, 1]);
        assert!(store.is_migrated().unwrap());

        assert_eq!(store.migrate_from_favorites(&[favorite(3, 6)]).unwrap(), 0);
        assert_eq!(item_ids(&store, &default), vec![2, 1]);
    }

    #[test]
    fn empty_migration_still_marks_store_migrated() {
        let (store, repo) = store();
        assert_eq!(store.migrate_from_favorites(&[]).unwrap(), 0);
        assert!(store.is_migrated().unwrap());
        assert!(repo.saved_state().unwrap().migrated);

        let reopened = store_with(&repo, WatchlistLimits::default());
        assert_eq!(reopened.migrate_from_favorites(&[favorite(1, 1)]).unwrap(), 0);
        assert!(reopened.get_default_watchlist().unwrap().items.is_empty());
    }

    #[test]
    fn migration_skips_present_items_and_respects_capacity() {
        let repo = MockWatchlistRepository::default();
        let limits = WatchlistLimits {
            max_items_per_watchlist: 2,
            ..WatchlistLimits::default()
        };
        let store = store_with(&repo, limits);
        let default = default_id(&store);
        store.add_item_to_watchlist(&default, item(1)).unwrap();

        let appended = store
            .migrate_from_favorites(&[favorite(1, 1), favorite(2, 2), favorite(3, 3)])
            .unwrap();
        assert_eq!(appended, 1);
        assert_eq!(item_ids(&store, &default), vec![1, 2]);
        assert!(store.is_migrated().unwrap());
    }
}
