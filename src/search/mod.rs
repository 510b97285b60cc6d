//! Derived views over the note collection: the selected note and the
//! filtered, recency-sorted list.
//!
//! Everything here is a pure function of its inputs; callers recompute after
//! every mutation instead of caching results.

use crate::entity::Note;

/// Look up the note whose id equals `selected_id`.
///
/// Returns `None` when nothing is selected or the id no longer exists.
pub fn selected_note<'a>(notes: &'a [Note], selected_id: Option<&str>) -> Option<&'a Note> {
    let id = selected_id?;
    notes.iter().find(|n| n.id == id)
}

/// Notes matching `search`, most recently updated first.
///
/// The term is trimmed before matching; an empty or whitespace-only term
/// keeps every note. Matching is a case-insensitive substring test against
/// the title or the content. Notes with equal `updated` keep their input
/// order.
pub fn filtered_sorted<'a>(notes: &'a [Note], search: &str) -> Vec<&'a Note> {
    let term = normalize_term(search);

    let mut result: Vec<&Note> = match term {
        None => notes.iter().collect(),
        Some(term) => notes.iter().filter(|n| matches_lowercase(n, &term)).collect(),
    };

    // `sort_by` is stable, which keeps ties in input order.
    result.sort_by(|a, b| b.updated.cmp(&a.updated));
    result
}

/// Whether `note` matches the search term (same rules as [`filtered_sorted`]).
pub fn matches(note: &Note, search: &str) -> bool {
    match normalize_term(search) {
        None => true,
        Some(term) => matches_lowercase(note, &term),
    }
}

/// Trimmed, lowercased term, or `None` when it is empty.
fn normalize_term(search: &str) -> Option<String> {
    let trimmed = search.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn matches_lowercase(note: &Note, term: &str) -> bool {
    note.title.to_lowercase().contains(term)
        || note.content.to_lowercase().contains(term)
}
