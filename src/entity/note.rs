use serde::{Deserialize, Serialize};

/// Title given to freshly created notes.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Label shown in place of an empty title.
pub const EMPTY_TITLE_LABEL: &str = "(No Title)";

/// Editable fields of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteField {
    Title,
    Content,
}

impl std::fmt::Display for NoteField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoteField::Title => write!(f, "title"),
            NoteField::Content => write!(f, "content"),
        }
    }
}

impl std::str::FromStr for NoteField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(NoteField::Title),
            "content" => Ok(NoteField::Content),
            _ => Err(format!("Invalid field: {}", s)),
        }
    }
}

/// A single note as persisted: `{id, title, content, updated}`.
///
/// `updated` is milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub updated: i64,
}

impl Note {
    /// A blank note titled "Untitled".
    pub fn new(id: String, updated: i64) -> Self {
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            content: String::new(),
            updated,
        }
    }

    pub fn with_text(id: &str, title: &str, content: &str, updated: i64) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            updated,
        }
    }

    /// Title for display, substituting "(No Title)" when empty.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            EMPTY_TITLE_LABEL
        } else {
            &self.title
        }
    }

    pub fn field(&self, field: NoteField) -> &str {
        match field {
            NoteField::Title => &self.title,
            NoteField::Content => &self.content,
        }
    }

    /// Replace one field and stamp the note. `updated` never moves backward.
    pub fn set_field(&mut self, field: NoteField, value: String, now: i64) {
        match field {
            NoteField::Title => self.title = value,
            NoteField::Content => self.content = value,
        }
        self.updated = self.updated.max(now);
    }
}
