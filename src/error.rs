use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotedeckError {
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Ambiguous note ID '{prefix}' matches {count} notes. Use more characters.")]
    AmbiguousId { prefix: String, count: usize },

    #[error("Invalid field '{0}'. Valid fields: title, content")]
    InvalidField(String),

    #[error("Use --force to delete in non-interactive mode")]
    ConfirmationRequired,

    #[error("Stored notes under key '{key}' are unreadable: {source}")]
    CorruptStore {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, NotedeckError>;
