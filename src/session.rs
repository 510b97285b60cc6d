//! Headless presentation shell.
//!
//! A [`Session`] pairs the persisted [`NoteStore`] with view state that is
//! never written anywhere: the selection, the search box, and whether the
//! sidebar is open. Front ends send intents to it and read the derived views
//! back after each one.

use tracing::debug;

use crate::entity::{Note, NoteField};
use crate::error::Result;
use crate::search::{filtered_sorted, selected_note};
use crate::storage::KeyValueStore;
use crate::store::NoteStore;

/// Prompt shown before a note is deleted.
pub const DELETE_PROMPT: &str = "Delete this note?";

/// Transient per-session view state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub selected_id: Option<String>,
    pub search: String,
    pub sidebar_open: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            selected_id: None,
            search: String::new(),
            sidebar_open: true,
        }
    }
}

/// Blocking yes/no confirmation.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub struct Session<S: KeyValueStore> {
    store: NoteStore<S>,
    view: ViewState,
}

impl<S: KeyValueStore> Session<S> {
    /// Load the store (seeding it if empty) and start with a fresh view.
    pub fn open(mut store: NoteStore<S>) -> Result<Self> {
        store.load()?;
        Ok(Self {
            store,
            view: ViewState::default(),
        })
    }

    /// Select a note and collapse the sidebar.
    pub fn select(&mut self, id: &str) {
        self.view.selected_id = Some(id.to_string());
        self.view.sidebar_open = false;
    }

    /// Create a note, select it, and collapse the sidebar.
    pub fn create(&mut self) -> Result<String> {
        let id = self.store.create()?;
        self.select(&id);
        Ok(id)
    }

    /// Edit a field of the selected note. Does nothing without a selection.
    pub fn edit(&mut self, field: NoteField, value: impl Into<String>) -> Result<bool> {
        match self.view.selected_id.clone() {
            Some(id) => self.store.update_field(&id, field, value),
            None => Ok(false),
        }
    }

    /// Delete `id` once the user confirms. Returns whether anything was removed.
    pub fn delete(&mut self, id: &str, confirm: &mut dyn Confirm) -> Result<bool> {
        if !confirm.confirm(DELETE_PROMPT) {
            debug!(id = %id, "delete declined");
            return Ok(false);
        }

        let existed = self.store.get(id).is_some();
        let selection = self
            .store
            .delete(id, self.view.selected_id.as_deref())?;
        self.view.selected_id = selection;
        Ok(existed)
    }

    pub fn toggle_sidebar(&mut self) {
        self.view.sidebar_open = !self.view.sidebar_open;
    }

    pub fn set_search(&mut self, term: &str) {
        self.view.search = term.to_string();
    }

    /// The note open in the editor, if any.
    pub fn selected_note(&self) -> Option<&Note> {
        selected_note(self.store.notes(), self.view.selected_id.as_deref())
    }

    /// Notes shown in the list for the current search.
    pub fn visible_notes(&self) -> Vec<&Note> {
        filtered_sorted(self.store.notes(), &self.view.search)
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn store(&self) -> &NoteStore<S> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::store::ManualClock;

    const NOW: i64 = 1_700_000_000_000;

    fn session() -> (Session<MemoryStorage>, ManualClock) {
        let clock = ManualClock::new(NOW);
        let store = NoteStore::new(MemoryStorage::new()).with_clock(clock.clone());
        (Session::open(store).unwrap(), clock)
    }

    fn yes(_: &str) -> bool {
        true
    }

    fn no(_: &str) -> bool {
        false
    }

    #[test]
    fn test_open_starts_with_seeds_and_default_view() {
        let (session, _clock) = session();
        assert_eq!(session.view(), &ViewState::default());
        assert!(session.view().sidebar_open);
        assert!(session.selected_note().is_none());

        let titles: Vec<&str> = session
            .visible_notes()
            .iter()
            .map(|n| n.title.as_str())
            .collect();
        assert_eq!(titles, vec!["React minimal notes", "Welcome to Notes!"]);
    }

    #[test]
    fn test_select_closes_sidebar() {
        let (mut session, _clock) = session();
        session.select("1");
        assert_eq!(session.selected_note().unwrap().title, "Welcome to Notes!");
        assert!(!session.view().sidebar_open);

        session.toggle_sidebar();
        assert!(session.view().sidebar_open);
    }

    #[test]
    fn test_create_selects_new_note() {
        let (mut session, clock) = session();
        clock.advance(1);
        let id = session.create().unwrap();

        assert_eq!(session.view().selected_id.as_deref(), Some(id.as_str()));
        assert!(!session.view().sidebar_open);
        assert_eq!(session.selected_note().unwrap().title, "Untitled");
        assert_eq!(session.visible_notes()[0].id, id);
    }

    #[test]
    fn test_edit_without_selection_is_noop() {
        let (mut session, _clock) = session();
        assert!(!session.edit(NoteField::Title, "x").unwrap());
        assert!(session.store().notes().iter().all(|n| n.title != "x"));
    }

    #[test]
    fn test_edit_then_search_recomputes_views() {
        let (mut session, clock) = session();
        let id = session.create().unwrap();
        clock.advance(5);
        session.edit(NoteField::Title, "Groceries").unwrap();
        session.edit(NoteField::Content, "milk").unwrap();

        assert_eq!(session.selected_note().unwrap().title, "Groceries");

        session.set_search("groc");
        let visible = session.visible_notes();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, id);

        session.set_search("");
        assert_eq!(session.visible_notes().len(), 3);
    }

    #[test]
    fn test_declined_delete_changes_nothing() {
        let (mut session, _clock) = session();
        session.select("2");

        assert!(!session.delete("2", &mut no).unwrap());
        assert_eq!(session.store().len(), 2);
        assert_eq!(session.view().selected_id.as_deref(), Some("2"));
    }

    #[test]
    fn test_delete_prompt_text() {
        let (mut session, _clock) = session();
        let mut seen = Vec::new();
        let mut record = |prompt: &str| {
            seen.push(prompt.to_string());
            false
        };
        session.delete("1", &mut record).unwrap();
        assert_eq!(seen, vec!["Delete this note?".to_string()]);
    }

    #[test]
    fn test_delete_selected_transfers_selection() {
        let (mut session, _clock) = session();
        session.select("2");

        assert!(session.delete("2", &mut yes).unwrap());
        assert_eq!(session.view().selected_id.as_deref(), Some("1"));

        assert!(session.delete("1", &mut yes).unwrap());
        assert_eq!(session.view().selected_id, None);
        assert!(session.selected_note().is_none());
        assert!(session.visible_notes().is_empty());
    }

    #[test]
    fn test_delete_other_note_keeps_selection() {
        let (mut session, _clock) = session();
        session.select("1");
        assert!(session.delete("2", &mut yes).unwrap());
        assert_eq!(session.view().selected_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_delete_unknown_id_reports_nothing_removed() {
        let (mut session, _clock) = session();
        session.select("1");
        assert!(!session.delete("ghost", &mut yes).unwrap());
        assert_eq!(session.store().len(), 2);
        assert_eq!(session.view().selected_id.as_deref(), Some("1"));
    }
}
