mod note;

pub use note::{Note, NoteField, DEFAULT_TITLE, EMPTY_TITLE_LABEL};
