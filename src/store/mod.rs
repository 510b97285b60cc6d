mod clock;
mod note_store;

pub use clock::{Clock, SystemClock};
#[cfg(test)]
pub use clock::ManualClock;
pub use note_store::{seed_notes, NoteStore, DEFAULT_STORAGE_KEY};
