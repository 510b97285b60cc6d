pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod logging;
pub mod search;
pub mod session;
pub mod storage;
pub mod store;
pub mod warnings;

pub use config::{Backend, Config};
pub use entity::{Note, NoteField};
pub use error::{NotedeckError, Result};
pub use session::{Confirm, Session, ViewState};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, SqliteStorage};
pub use store::NoteStore;
