use std::collections::VecDeque;

use serde_json::json;
use tracing::{debug, warn};
use ulid::{Generator, Ulid};

use crate::cache::QueryCache;
use crate::models::{
    Country, CountryChange, HistoryAction, HistoryEntry, NewCountry, Snapshot, read_log,
    sample_countries,
};
use crate::query::CountryStats;
use crate::storage::{self, COUNTRIES_KEY, HISTORY_KEY, KeyValueStore};
use crate::transfer::ExportDocument;
use crate::undo::UndoHistory;

/// Default cap on the audit log.
pub const DEFAULT_AUDIT_CAPACITY: usize = 50;

/// One mutation of the country collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CountryCommand {
    Add(NewCountry),
    Edit {
        id: String,
        changes: Vec<CountryChange>,
    },
    Delete {
        id: String,
    },
    ToggleVisited {
        id: String,
    },
}

impl CountryCommand {
    pub fn action(&self) -> HistoryAction {
        match self {
            Self::Add(_) => HistoryAction::Add,
            Self::Edit { .. } => HistoryAction::Edit,
            Self::Delete { .. } => HistoryAction::Delete,
            Self::ToggleVisited { .. } => HistoryAction::ToggleVisited,
        }
    }
}

/// Country collection with snapshot undo/redo and a capped audit log.
///
/// Every mutation saves the full pre-mutation collection, clears the redo
/// stack, applies the change and appends an audit entry. The collection and
/// audit log are written back to the [`KeyValueStore`] after each change;
/// write failures are logged and otherwise ignored. Mutations referencing an
/// unknown id change nothing but are still recorded.
pub struct CountryStore<S: KeyValueStore> {
    backend: S,
    countries: Vec<Country>,
    undo: UndoHistory<Snapshot>,
    history: VecDeque<HistoryEntry>,
    audit_capacity: usize,
    ids: Generator,
    revision: u64,
    stats_cache: QueryCache<u64, CountryStats>,
}

impl<S: KeyValueStore> CountryStore<S> {
    /// Load from `backend`, seeding the sample dataset when nothing usable is stored.
    pub fn load(backend: S) -> Self {
        Self::load_with_capacity(backend, DEFAULT_AUDIT_CAPACITY)
    }

    pub fn load_with_capacity(backend: S, audit_capacity: usize) -> Self {
        let countries = match storage::read_json::<Vec<Country>, _>(&backend, COUNTRIES_KEY) {
            Ok(Some(countries)) => countries,
            Ok(None) => {
                debug!("no saved countries, seeding sample data");
                sample_countries()
            }
            Err(e) => {
                warn!(error = %e, "failed to load countries, falling back to sample data");
                sample_countries()
            }
        };

        // Stored newest first.
        let mut history: VecDeque<HistoryEntry> =
            storage::load_or_log::<serde_json::Value, _>(&backend, HISTORY_KEY)
                .map(read_log)
                .unwrap_or_default()
                .into_iter()
                .rev()
                .collect();
        while history.len() > audit_capacity {
            history.pop_front();
        }

        Self::from_parts(backend, countries, history, audit_capacity)
    }

    /// Start from an explicit collection without reading the backend.
    pub fn with_countries(backend: S, countries: Vec<Country>) -> Self {
        Self::from_parts(backend, countries, VecDeque::new(), DEFAULT_AUDIT_CAPACITY)
    }

    fn from_parts(
        backend: S,
        countries: Vec<Country>,
        history: VecDeque<HistoryEntry>,
        audit_capacity: usize,
    ) -> Self {
        Self {
            backend,
            countries,
            undo: UndoHistory::new(),
            history,
            audit_capacity: audit_capacity.max(1),
            ids: Generator::new(),
            revision: 0,
            stats_cache: QueryCache::new(),
        }
    }

    // ─── Accessors ──────────────────────────────────────────

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn get(&self, id: &str) -> Option<&Country> {
        self.countries.iter().find(|c| c.id == id)
    }

    /// Audit log, oldest first.
    pub fn history(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> + ExactSizeIterator {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.undo.redo_depth()
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Aggregate statistics, memoized until the next change.
    pub fn stats(&mut self) -> CountryStats {
        let countries = &self.countries;
        self.stats_cache
            .get_or_insert_with(self.revision, || CountryStats::compute(countries))
    }

    // ─── Mutations ──────────────────────────────────────────

    /// Dispatch a command. Returns the new id for `Add`.
    pub fn apply(&mut self, command: CountryCommand) -> Option<String> {
        debug!(action = %command.action(), "applying country command");
        self.undo.record(Snapshot::of(&self.countries));

        match command {
            CountryCommand::Add(new) => {
                let id = self.next_id();
                let country = Country::from_new(id.clone(), new);
                let data = json!({ "country": country });
                self.countries.push(country);
                self.commit(HistoryAction::Add, data);
                Some(id)
            }
            CountryCommand::Edit { id, changes } => {
                if let Some(country) = self.countries.iter_mut().find(|c| c.id == id) {
                    for change in &changes {
                        country.apply_change(change);
                    }
                }
                self.commit(HistoryAction::Edit, json!({ "id": id, "updates": changes }));
                None
            }
            CountryCommand::Delete { id } => {
                let removed = self
                    .countries
                    .iter()
                    .position(|c| c.id == id)
                    .map(|idx| self.countries.remove(idx));
                self.commit(HistoryAction::Delete, json!({ "country": removed }));
                None
            }
            CountryCommand::ToggleVisited { id } => {
                if let Some(country) = self.countries.iter_mut().find(|c| c.id == id) {
                    country.visited = !country.visited;
                }
                self.commit(HistoryAction::ToggleVisited, json!({ "id": id }));
                None
            }
        }
    }

    pub fn add(&mut self, country: NewCountry) -> String {
        self.apply(CountryCommand::Add(country))
            .unwrap_or_default()
    }

    pub fn edit(&mut self, id: &str, changes: Vec<CountryChange>) {
        self.apply(CountryCommand::Edit {
            id: id.to_string(),
            changes,
        });
    }

    pub fn delete(&mut self, id: &str) {
        self.apply(CountryCommand::Delete { id: id.to_string() });
    }

    pub fn toggle_visited(&mut self, id: &str) {
        self.apply(CountryCommand::ToggleVisited { id: id.to_string() });
    }

    /// Restore the previous snapshot. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let current = Snapshot::of(&self.countries);
        let Some(previous) = self.undo.undo(current) else {
            return false;
        };
        let data = json!({ "previousState": previous });
        self.countries = previous.countries;
        self.commit(HistoryAction::Undo, data);
        true
    }

    /// Re-apply the most recently undone snapshot. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let current = Snapshot::of(&self.countries);
        let Some(next) = self.undo.redo(current) else {
            return false;
        };
        let data = json!({ "nextState": next });
        self.countries = next.countries;
        self.commit(HistoryAction::Redo, data);
        true
    }

    /// Drop the audit log and both undo stacks. The collection is left as is.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.undo.clear();
        self.persist_history();
    }

    /// Replace the whole collection with a validated export document as one
    /// undoable step.
    pub fn import(&mut self, document: &ExportDocument) {
        self.undo.record(Snapshot::of(&self.countries));
        self.countries = document.countries.clone();
        let count = self.countries.len();
        self.commit(HistoryAction::Import, json!({ "count": count }));
    }

    /// Append an audit entry that is not tied to a change of the collection.
    /// Any tag is accepted; unknown ones are kept as [`HistoryAction::Other`].
    pub fn record_event(&mut self, action: impl Into<HistoryAction>, data: serde_json::Value) {
        self.push_history(HistoryEntry::new(action, data));
        self.persist_history();
    }

    // ─── Internals ──────────────────────────────────────────

    fn next_id(&mut self) -> String {
        // Monotonic within this store; overflow of the random part in the
        // same millisecond falls back to a fresh random ULID.
        self.ids
            .generate()
            .unwrap_or_else(|_| Ulid::new())
            .to_string()
    }

    fn commit(&mut self, action: HistoryAction, data: serde_json::Value) {
        self.revision += 1;
        self.stats_cache.clear();
        self.push_history(HistoryEntry::new(action, data));
        self.persist_countries();
        self.persist_history();
    }

    fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push_back(entry);
        while self.history.len() > self.audit_capacity {
            self.history.pop_front();
        }
    }

    fn persist_countries(&mut self) {
        storage::persist_or_log(&mut self.backend, COUNTRIES_KEY, &self.countries);
    }

    fn persist_history(&mut self) {
        let newest_first: Vec<&HistoryEntry> = self.history.iter().rev().collect();
        storage::persist_or_log(&mut self.backend, HISTORY_KEY, &newest_first);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, RouteStampError};
    use crate::storage::MemoryStore;

    fn peru() -> NewCountry {
        NewCountry::new("Peru", "PE", "South America")
    }

    fn empty_store() -> CountryStore<MemoryStore> {
        CountryStore::with_countries(MemoryStore::new(), Vec::new())
    }

    /// Backend whose reads and writes always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(RouteStampError::Io(std::io::Error::other("unavailable")))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(RouteStampError::Io(std::io::Error::other("quota exceeded")))
        }
        fn remove(&mut self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_add_undo_redo_keeps_id() {
        let mut store = empty_store();
        let id = store.add(peru());
        assert_eq!(store.countries().len(), 1);

        assert!(store.undo());
        assert!(store.countries().is_empty());
        assert_eq!(store.redo_depth(), 1);

        assert!(store.redo());
        assert_eq!(store.countries().len(), 1);
        assert_eq!(store.countries()[0].id, id);
        assert_eq!(store.countries()[0].name, "Peru");
    }

    #[test]
    fn test_undo_sequence_restores_initial_state() {
        let mut store = CountryStore::with_countries(MemoryStore::new(), sample_countries());
        let initial = store.countries().to_vec();

        let id = store.add(peru());
        store.edit("2", vec![CountryChange::Rating(Some(3))]);
        store.toggle_visited(&id);
        store.delete("1");
        store.edit("nonexistent-id", vec![CountryChange::Home(true)]);

        for _ in 0..5 {
            assert!(store.undo());
        }
        assert_eq!(store.countries(), initial.as_slice());
        assert!(!store.undo());
    }

    #[test]
    fn test_redo_inverts_undo() {
        let mut store = CountryStore::with_countries(MemoryStore::new(), sample_countries());
        store.toggle_visited("4");
        let after = store.countries().to_vec();

        store.undo();
        assert!(!store.get("4").unwrap().visited);
        store.redo();
        assert_eq!(store.countries(), after.as_slice());
    }

    #[test]
    fn test_new_mutation_after_undo_clears_redo() {
        let mut store = empty_store();
        store.add(peru());
        store.undo();
        assert!(store.can_redo());

        store.add(NewCountry::new("Chile", "CL", "South America"));
        assert!(!store.can_redo());
        let before = store.countries().to_vec();
        assert!(!store.redo());
        assert_eq!(store.countries(), before.as_slice());
    }

    #[test]
    fn test_edit_unknown_id_still_pushes_frame() {
        let mut store = CountryStore::with_countries(MemoryStore::new(), sample_countries());
        let before = store.countries().to_vec();

        store.edit("nonexistent-id", vec![CountryChange::Rating(Some(5))]);

        assert_eq!(store.countries(), before.as_slice());
        assert_eq!(store.undo_depth(), 1);
        let last = store.history().last().unwrap();
        assert_eq!(last.action, HistoryAction::Edit);
    }

    #[test]
    fn test_delete_records_removed_country() {
        let mut store = CountryStore::with_countries(MemoryStore::new(), sample_countries());
        store.delete("2");
        assert!(store.get("2").is_none());
        let entry = store.history().last().unwrap();
        assert_eq!(entry.data["country"]["name"], "Japan");

        store.delete("missing");
        let entry = store.history().last().unwrap();
        assert!(entry.data["country"].is_null());
    }

    #[test]
    fn test_audit_log_capped_fifo() {
        let mut store = empty_store();
        let id = store.add(peru());
        for _ in 0..60 {
            store.toggle_visited(&id);
        }
        assert_eq!(store.history_len(), DEFAULT_AUDIT_CAPACITY);
        // the `add` entry was evicted first
        assert!(store.history().all(|e| e.action == HistoryAction::ToggleVisited));
    }

    #[test]
    fn test_clear_history_keeps_records() {
        let mut store = CountryStore::with_countries(MemoryStore::new(), sample_countries());
        store.add(peru());
        store.undo();
        store.add(peru());
        let records = store.countries().to_vec();

        store.clear_history();

        assert_eq!(store.countries(), records.as_slice());
        assert_eq!(store.history_len(), 0);
        assert!(!store.can_undo());
        assert!(!store.can_redo());
    }

    #[test]
    fn test_undo_audit_payload_is_restored_snapshot() {
        let mut store = empty_store();
        store.add(peru());
        store.undo();
        let entry = store.history().last().unwrap();
        assert_eq!(entry.action, HistoryAction::Undo);
        assert_eq!(entry.data["previousState"]["countries"], json!([]));
    }

    #[test]
    fn test_undo_on_empty_stack_logs_nothing() {
        let mut store = empty_store();
        assert!(!store.undo());
        assert!(!store.redo());
        assert_eq!(store.history_len(), 0);
    }

    #[test]
    fn test_rapid_adds_get_distinct_ordered_ids() {
        let mut store = empty_store();
        let ids: Vec<String> = (0..100).map(|_| store.add(peru())).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, ids);
    }

    #[test]
    fn test_load_seeds_sample_when_empty() {
        let store = CountryStore::load(MemoryStore::new());
        assert_eq!(store.countries().len(), 8);
    }

    #[test]
    fn test_load_falls_back_on_corrupt_json() {
        let mut backend = MemoryStore::new();
        backend.set(COUNTRIES_KEY, "[{broken").unwrap();
        let store = CountryStore::load(backend);
        assert_eq!(store.countries(), sample_countries().as_slice());
    }

    #[test]
    fn test_changes_are_persisted_and_reloaded() {
        let mut store = empty_store();
        let id = store.add(peru());
        store.edit(&id, vec![CountryChange::Notes(Some("Machu Picchu".into()))]);

        let reloaded = CountryStore::load(store.into_backend());
        assert_eq!(reloaded.countries().len(), 1);
        assert_eq!(reloaded.countries()[0].notes.as_deref(), Some("Machu Picchu"));
        assert_eq!(reloaded.history_len(), 2);
        assert!(!reloaded.can_undo());
    }

    #[test]
    fn test_broken_backend_degrades_to_memory() {
        let mut store = CountryStore::load(BrokenStore);
        assert_eq!(store.countries().len(), 8);

        let id = store.add(peru());
        assert!(store.get(&id).is_some());
        assert!(store.undo());
        assert!(store.get(&id).is_none());
    }

    #[test]
    fn test_stats_memoized_until_change() {
        let mut store = CountryStore::with_countries(MemoryStore::new(), sample_countries());
        let first = store.stats();
        assert_eq!(first.visited, 5);
        assert_eq!(store.stats_cache.counters(), (0, 1));

        store.stats();
        assert_eq!(store.stats_cache.counters(), (1, 1));

        store.toggle_visited("4");
        assert_eq!(store.stats().visited, 6);
        assert_eq!(store.stats_cache.len(), 1);
    }

    #[test]
    fn test_import_is_undoable() {
        let mut store = CountryStore::with_countries(MemoryStore::new(), sample_countries());
        let doc = ExportDocument::capture(
            vec![Country::from_new("x", peru())],
            Default::default(),
            Vec::new(),
        );

        store.import(&doc);
        assert_eq!(store.countries().len(), 1);
        assert_eq!(store.history().last().unwrap().action, HistoryAction::Import);

        store.undo();
        assert_eq!(store.countries().len(), 8);
    }

    #[test]
    fn test_history_capacity_applied_on_load() {
        let mut backend = MemoryStore::new();
        // newest first, as persisted
        let entries: Vec<HistoryEntry> = (0..10)
            .map(|_| HistoryEntry::new(HistoryAction::Undo, serde_json::Value::Null))
            .collect();
        storage::write_json(&mut backend, HISTORY_KEY, &entries).unwrap();

        let store = CountryStore::load_with_capacity(backend, 4);
        assert_eq!(store.history_len(), 4);
        assert_eq!(store.history().last().unwrap().id, entries[0].id);
        assert_eq!(store.history().next().unwrap().id, entries[3].id);
    }

    #[test]
    fn test_history_persisted_newest_first() {
        let mut store = empty_store();
        let id = store.add(peru());
        store.toggle_visited(&id);

        let raw = store.into_backend().get(HISTORY_KEY).unwrap().unwrap();
        let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored[0]["action"], "toggle_visited");
        assert_eq!(stored[1]["action"], "add");
    }

    #[test]
    fn test_stored_log_with_unknown_tag_survives_reload() {
        let mut backend = MemoryStore::new();
        backend
            .set(
                HISTORY_KEY,
                r#"[
                    {"id":"3","action":"export","data":{},"timestamp":"2024-03-03T10:00:00.000Z"},
                    {"id":"2","action":"toggle_visited","data":{"id":"1"},"timestamp":"2024-03-02T10:00:00.000Z"},
                    {"id":"1","action":"add","data":{"country":{"name":"Peru"}},"timestamp":"2024-03-01T10:00:00.000Z"}
                ]"#,
            )
            .unwrap();

        let mut store = CountryStore::load(backend);
        let ids: Vec<&str> = store.history().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(
            store.history().last().unwrap().action,
            HistoryAction::Other("export".into())
        );

        store.toggle_visited("1");
        let reloaded = CountryStore::load(store.into_backend());
        assert_eq!(reloaded.history_len(), 4);
        assert_eq!(reloaded.history().next().unwrap().id, "1");
        assert_eq!(reloaded.history().last().unwrap().action, HistoryAction::ToggleVisited);
    }

    #[test]
    fn test_record_event_accepts_any_tag() {
        let mut store = CountryStore::with_countries(MemoryStore::new(), sample_countries());
        store.record_event("export", json!({ "count": 8 }));

        assert_eq!(store.countries().len(), 8);
        assert!(!store.can_undo());
        let entry = store.history().last().unwrap();
        assert_eq!(entry.action, HistoryAction::Other("export".into()));
        assert_eq!(entry.data["count"], 8);

        store.record_event(HistoryAction::Import, json!({ "count": 0 }));
        let reloaded = CountryStore::load(store.into_backend());
        assert_eq!(reloaded.history_len(), 2);
    }

    #[test]
    fn test_edit_payload_uses_updates_key() {
        let mut store = CountryStore::with_countries(MemoryStore::new(), sample_countries());
        store.edit("1", vec![CountryChange::Rating(Some(3))]);
        let entry = store.history().last().unwrap();
        assert_eq!(entry.data["id"], "1");
        assert!(entry.data["updates"].is_array());
    }
}
