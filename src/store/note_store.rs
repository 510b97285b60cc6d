use std::collections::HashSet;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entity::{Note, NoteField};
use crate::error::{NotedeckError, Result};
use crate::search::filtered_sorted;
use crate::storage::KeyValueStore;

use super::clock::{Clock, SystemClock};

/// Key the serialized collection lives under.
pub const DEFAULT_STORAGE_KEY: &str = "notes_data";

const DAY_MS: i64 = 86_400_000;
const HALF_DAY_MS: i64 = 43_200_000;
const ID_SUFFIX_LEN: usize = 6;

/// The two demonstration notes written to an empty store.
///
/// The newer one ("React minimal notes") sorts first.
pub fn seed_notes(now_ms: i64) -> Vec<Note> {
    vec![
        Note::with_text(
            "1",
            "Welcome to Notes!",
            "Click any note or create a new one to get started.",
            now_ms - DAY_MS,
        ),
        Note::with_text(
            "2",
            "React minimal notes",
            "This is a simple React notes app.",
            now_ms - HALF_DAY_MS,
        ),
    ]
}

/// Owner of the note collection.
///
/// Every mutation rewrites the whole collection to storage before returning.
pub struct NoteStore<S: KeyValueStore> {
    storage: S,
    key: String,
    clock: Box<dyn Clock>,
    notes: Vec<Note>,
    payload_bytes: usize,
}

impl<S: KeyValueStore> NoteStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: &str) -> Self {
        Self {
            storage,
            key: key.to_string(),
            clock: Box::new(SystemClock),
            notes: Vec::new(),
            payload_bytes: 0,
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Read the persisted collection, seeding the store when nothing is there.
    ///
    /// A failed read counts as "nothing stored". Stored data that does not
    /// parse is an error; it is never replaced by the seed notes.
    pub fn load(&mut self) -> Result<&[Note]> {
        let raw = match self.storage.get(&self.key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %self.key, error = %e, "notes read failed, treating as empty");
                None
            }
        };

        match raw {
            Some(raw) => {
                let parsed: Vec<Note> =
                    serde_json::from_str(&raw).map_err(|source| NotedeckError::CorruptStore {
                        key: self.key.clone(),
                        source,
                    })?;
                self.notes = dedupe_ids(parsed);
                self.payload_bytes = raw.len();
                debug!(key = %self.key, count = self.notes.len(), "notes loaded");
            }
            None => {
                self.notes = seed_notes(self.clock.now_ms());
                info!(key = %self.key, "no stored notes, writing seed notes");
                self.persist()?;
            }
        }

        Ok(self.notes.as_slice())
    }

    /// Insert a blank "Untitled" note at the front and return its id.
    pub fn create(&mut self) -> Result<String> {
        let now = self.clock.now_ms();
        let id = self.fresh_id(now);
        self.notes.insert(0, Note::new(id.clone(), now));
        debug!(id = %id, "note created");
        self.persist()?;
        Ok(id)
    }

    /// Set one field of a note and bump its timestamp.
    ///
    /// Returns `false` without touching storage when `id` is unknown.
    pub fn update_field(
        &mut self,
        id: &str,
        field: NoteField,
        value: impl Into<String>,
    ) -> Result<bool> {
        let now = self.clock.now_ms();
        let Some(note) = self.notes.iter_mut().find(|n| n.id == id) else {
            return Ok(false);
        };
        note.set_field(field, value.into(), now);
        debug!(id = %id, field = %field, updated = note.updated, "note updated");
        self.persist()?;
        Ok(true)
    }

    /// Remove a note and work out what should be selected afterwards.
    ///
    /// When the deleted note was `selected`, the selection moves to the note
    /// now first in display order, or to none when the store is empty. Any
    /// other selection is returned unchanged. Unknown ids are a no-op.
    pub fn delete(&mut self, id: &str, selected: Option<&str>) -> Result<Option<String>> {
        let unchanged = selected.map(str::to_string);
        let Some(index) = self.notes.iter().position(|n| n.id == id) else {
            return Ok(unchanged);
        };

        self.notes.remove(index);
        debug!(id = %id, remaining = self.notes.len(), "note deleted");
        self.persist()?;

        if selected != Some(id) {
            return Ok(unchanged);
        }
        Ok(filtered_sorted(&self.notes, "")
            .first()
            .map(|n| n.id.clone()))
    }

    /// Write the full collection under the storage key.
    pub fn persist(&mut self) -> Result<()> {
        let payload = serde_json::to_string(&self.notes)?;
        self.storage.set(&self.key, &payload)?;
        self.payload_bytes = payload.len();
        debug!(key = %self.key, count = self.notes.len(), bytes = payload.len(), "notes persisted");
        Ok(())
    }

    /// Notes in stored order (newest creations first).
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Find a note by exact id, falling back to a unique id prefix.
    pub fn resolve(&self, id_or_prefix: &str) -> Result<&Note> {
        if let Some(note) = self.get(id_or_prefix) {
            return Ok(note);
        }
        if id_or_prefix.is_empty() {
            return Err(NotedeckError::NoteNotFound(id_or_prefix.to_string()));
        }

        let mut matches = self
            .notes
            .iter()
            .filter(|n| n.id.starts_with(id_or_prefix));
        match (matches.next(), matches.count()) {
            (Some(note), 0) => Ok(note),
            (Some(_), rest) => Err(NotedeckError::AmbiguousId {
                prefix: id_or_prefix.to_string(),
                count: rest + 1,
            }),
            (None, _) => Err(NotedeckError::NoteNotFound(id_or_prefix.to_string())),
        }
    }

    /// Size of the last payload read or written, in bytes.
    pub fn payload_bytes(&self) -> usize {
        self.payload_bytes
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// `<millis>_<6 hex chars>`, regenerated until it is unused.
    fn fresh_id(&self, now: i64) -> String {
        loop {
            let suffix = Uuid::new_v4().simple().to_string();
            let id = format!("{}_{}", now, &suffix[..ID_SUFFIX_LEN]);
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

fn dedupe_ids(notes: Vec<Note>) -> Vec<Note> {
    let mut seen = HashSet::new();
    let total = notes.len();
    let kept: Vec<Note> = notes
        .into_iter()
        .filter(|n| seen.insert(n.id.clone()))
        .collect();
    if kept.len() != total {
        warn!(dropped = total - kept.len(), "duplicate note ids in stored data");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{filtered_sorted, selected_note};
    use crate::store::ManualClock;
    use crate::storage::MemoryStorage;

    const NOW: i64 = 1_700_000_000_000;

    fn store_at(now: i64) -> (NoteStore<MemoryStorage>, ManualClock) {
        let clock = ManualClock::new(now);
        let store = NoteStore::new(MemoryStorage::new()).with_clock(clock.clone());
        (store, clock)
    }

    fn stored_notes(store: &NoteStore<MemoryStorage>) -> Vec<Note> {
        let raw = store
            .storage()
            .get(DEFAULT_STORAGE_KEY)
            .unwrap()
            .expect("collection should be persisted");
        serde_json::from_str(&raw).unwrap()
    }

    struct FailingStorage;

    impl KeyValueStore for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(NotedeckError::Storage("disk on fire".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_load_empty_store_seeds_two_notes() {
        let (mut store, _clock) = store_at(NOW);
        let notes = store.load().unwrap().to_vec();

        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].updated, NOW - 86_400_000);
        assert_eq!(notes[1].updated, NOW - 43_200_000);

        let sorted = filtered_sorted(&notes, "");
        assert_eq!(sorted[0].title, "React minimal notes");
        assert_eq!(sorted[1].title, "Welcome to Notes!");

        // Seeds are written immediately.
        assert_eq!(stored_notes(&store), notes);
    }

    #[test]
    fn test_load_reads_existing_collection() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                DEFAULT_STORAGE_KEY,
                r#"[{"id":"a","title":"Kept","content":"x","updated":5}]"#,
            )
            .unwrap();

        let mut store = NoteStore::new(storage);
        let notes = store.load().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Kept");
    }

    #[test]
    fn test_load_keeps_persisted_empty_collection() {
        let mut storage = MemoryStorage::new();
        storage.set(DEFAULT_STORAGE_KEY, "[]").unwrap();

        let mut store = NoteStore::new(storage);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_corrupt_data_fails_without_overwriting() {
        let mut storage = MemoryStorage::new();
        storage.set(DEFAULT_STORAGE_KEY, "{not json").unwrap();

        let mut store = NoteStore::new(storage);
        let result = store.load();
        assert!(matches!(result, Err(NotedeckError::CorruptStore { .. })));
        assert_eq!(
            store.storage().get(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn test_load_read_failure_falls_back_to_seeds() {
        let mut store = NoteStore::new(FailingStorage).with_clock(ManualClock::new(NOW));
        let notes = store.load().unwrap();
        assert_eq!(notes.len(), 2);
    }

    #[test]
    fn test_load_drops_duplicate_ids() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                DEFAULT_STORAGE_KEY,
                r#"[{"id":"a","title":"first","content":"","updated":1},
                    {"id":"a","title":"second","content":"","updated":2}]"#,
            )
            .unwrap();

        let mut store = NoteStore::new(storage);
        let notes = store.load().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "first");
    }

    #[test]
    fn test_create_inserts_untitled_note_at_front() {
        let (mut store, clock) = store_at(NOW);
        store.load().unwrap();
        clock.advance(10);

        let id = store.create().unwrap();

        assert_eq!(store.len(), 3);
        let note = &store.notes()[0];
        assert_eq!(note.id, id);
        assert_eq!(note.title, "Untitled");
        assert_eq!(note.content, "");
        assert_eq!(note.updated, NOW + 10);

        let sorted = filtered_sorted(store.notes(), "");
        assert_eq!(sorted[0].id, id);
        assert_eq!(stored_notes(&store).len(), 3);
    }

    #[test]
    fn test_create_ids_are_unique_within_same_millisecond() {
        let (mut store, _clock) = store_at(NOW);
        store.load().unwrap();

        let mut ids = HashSet::new();
        for _ in 0..200 {
            let id = store.create().unwrap();
            assert!(id.starts_with(&format!("{}_", NOW)));
            assert!(ids.insert(id), "duplicate id generated");
        }
        assert_eq!(store.len(), 202);
    }

    #[test]
    fn test_update_field_bumps_only_target_note() {
        let (mut store, clock) = store_at(NOW);
        store.load().unwrap();
        let before = store.get("1").unwrap().clone();

        clock.advance(1_000);
        assert!(store
            .update_field("2", NoteField::Title, "Groceries")
            .unwrap());

        let updated = store.get("2").unwrap();
        assert_eq!(updated.title, "Groceries");
        assert_eq!(updated.updated, NOW + 1_000);
        assert_eq!(store.get("1").unwrap(), &before);
        assert_eq!(stored_notes(&store)[1].title, "Groceries");
    }

    #[test]
    fn test_update_field_timestamps_are_monotonic() {
        let (mut store, clock) = store_at(NOW);
        store.load().unwrap();
        let id = store.create().unwrap();

        let mut last = store.get(&id).unwrap().updated;
        for step in [5, 0, -3_000, 7] {
            clock.advance(step);
            store
                .update_field(&id, NoteField::Content, format!("step {}", step))
                .unwrap();
            let current = store.get(&id).unwrap().updated;
            assert!(current >= last);
            last = current;
        }
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let (mut store, _clock) = store_at(NOW);
        store.load().unwrap();
        let snapshot = store.notes().to_vec();

        assert!(!store
            .update_field("missing", NoteField::Title, "x")
            .unwrap());
        assert_eq!(store.notes(), snapshot.as_slice());
    }

    #[test]
    fn test_update_then_search_finds_note() {
        let (mut store, clock) = store_at(NOW);
        store.load().unwrap();
        let id = store.create().unwrap();
        clock.advance(1);
        store.update_field(&id, NoteField::Title, "Groceries").unwrap();

        let found = filtered_sorted(store.notes(), "groc");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
    }

    #[test]
    fn test_delete_selected_moves_selection_to_first_displayed() {
        let (mut store, clock) = store_at(NOW);
        store.load().unwrap();
        clock.advance(5);
        let newest = store.create().unwrap();

        // "2" is more recent than "1", so it is first once `newest` is gone.
        let selection = store.delete(&newest, Some(&newest)).unwrap();
        assert_eq!(selection.as_deref(), Some("2"));
        assert!(store.get(&newest).is_none());
        assert_eq!(stored_notes(&store).len(), 2);
    }

    #[test]
    fn test_delete_unselected_keeps_selection() {
        let (mut store, _clock) = store_at(NOW);
        store.load().unwrap();

        let selection = store.delete("1", Some("2")).unwrap();
        assert_eq!(selection.as_deref(), Some("2"));
        assert_eq!(store.len(), 1);

        let selection = store.delete("2", None).unwrap();
        assert_eq!(selection, None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_last_selected_note_clears_selection() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                DEFAULT_STORAGE_KEY,
                r#"[{"id":"only","title":"t","content":"","updated":1}]"#,
            )
            .unwrap();
        let mut store = NoteStore::new(storage);
        store.load().unwrap();

        let selection = store.delete("only", Some("only")).unwrap();
        assert_eq!(selection, None);
        assert!(store.is_empty());
        assert!(selected_note(store.notes(), selection.as_deref()).is_none());
        assert!(stored_notes(&store).is_empty());
    }

    #[test]
    fn test_delete_missing_id_is_noop() {
        let (mut store, _clock) = store_at(NOW);
        store.load().unwrap();

        let selection = store.delete("missing", Some("1")).unwrap();
        assert_eq!(selection.as_deref(), Some("1"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_persist_round_trip_is_lossless() {
        let (mut store, clock) = store_at(NOW);
        store.load().unwrap();
        let id = store.create().unwrap();
        clock.advance(3);
        store
            .update_field(&id, NoteField::Content, "line one\nline \"two\" ✓")
            .unwrap();
        store.update_field("1", NoteField::Title, "").unwrap();

        let original = store.notes().to_vec();
        assert_eq!(stored_notes(&store), original);

        let mut reopened = NoteStore::new(store.storage().clone());
        assert_eq!(reopened.load().unwrap(), original.as_slice());
    }

    #[test]
    fn test_custom_key_is_used() {
        let mut store = NoteStore::with_key(MemoryStorage::new(), "other_key");
        store.load().unwrap();
        assert_eq!(store.storage_key(), "other_key");
        assert!(store.storage().get("other_key").unwrap().is_some());
        assert!(store.storage().get(DEFAULT_STORAGE_KEY).unwrap().is_none());
        assert!(store.payload_bytes() > 0);
    }

    #[test]
    fn test_resolve_by_exact_id_and_prefix() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                DEFAULT_STORAGE_KEY,
                r#"[{"id":"abc123","title":"a","content":"","updated":1},
                    {"id":"abd456","title":"b","content":"","updated":2},
                    {"id":"ab","title":"c","content":"","updated":3}]"#,
            )
            .unwrap();
        let mut store = NoteStore::new(storage);
        store.load().unwrap();

        assert_eq!(store.resolve("ab").unwrap().title, "c");
        assert_eq!(store.resolve("abc").unwrap().title, "a");
        assert!(matches!(
            store.resolve("abd4"),
            Ok(note) if note.title == "b"
        ));
        assert!(matches!(
            store.resolve("a"),
            Err(NotedeckError::AmbiguousId { count: 3, .. })
        ));
        assert!(matches!(
            store.resolve("zzz"),
            Err(NotedeckError::NoteNotFound(_))
        ));
        assert!(matches!(
            store.resolve(""),
            Err(NotedeckError::NoteNotFound(_))
        ));
    }
}
