use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::config::{default_data_dir, Backend, Config};
use crate::entity::{Note, NoteField};
use crate::error::{NotedeckError, Result};
use crate::search::filtered_sorted;
use crate::session::Session;
use crate::storage::{FileStorage, KeyValueStore, SqliteStorage};
use crate::store::NoteStore;
use crate::warnings::{check_thresholds, format_warning};

use super::shell::run_shell;

/// Resolved data directory plus the config found there.
#[derive(Debug, Clone)]
pub struct Context {
    pub data_dir: PathBuf,
    pub config: Config,
}

impl Context {
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        let config = Config::load(&data_dir)?;
        Ok(Self { data_dir, config })
    }

    /// Store over the configured backend, not yet loaded.
    pub fn store(&self) -> Result<NoteStore<Box<dyn KeyValueStore>>> {
        let storage = open_storage(self.config.backend, &self.data_dir)?;
        Ok(NoteStore::with_key(storage, &self.config.storage_key))
    }

    /// Open the configured backend and load the notes (seeding if empty).
    pub fn open_store(&self) -> Result<NoteStore<Box<dyn KeyValueStore>>> {
        let mut store = self.store()?;
        store.load()?;
        Ok(store)
    }
}

fn open_storage(backend: Backend, data_dir: &Path) -> Result<Box<dyn KeyValueStore>> {
    Ok(match backend {
        Backend::File => Box::new(FileStorage::open(data_dir)?),
        Backend::Sqlite => Box::new(SqliteStorage::open(data_dir)?),
    })
}

pub fn handle_list(ctx: &Context, search: Option<String>, json: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let search = search.unwrap_or_default();
    let notes = filtered_sorted(store.notes(), &search);

    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
    } else if notes.is_empty() {
        if search.trim().is_empty() {
            println!("No notes.");
        } else {
            println!("No notes found for '{}'.", search);
        }
    } else {
        println!("Notes:\n");
        for n in notes {
            println!("  {}", format_list_line(n));
        }
    }

    print_warnings(&store);
    Ok(())
}

pub fn handle_new(ctx: &Context, title: Option<String>, stdin: bool, json: bool) -> Result<()> {
    let mut store = ctx.open_store()?;

    let id = store.create()?;
    if let Some(title) = title {
        store.update_field(&id, NoteField::Title, title)?;
    }
    if stdin {
        let content = read_stdin()?;
        if !content.is_empty() {
            store.update_field(&id, NoteField::Content, content)?;
        }
    }

    let note = lookup(&store, &id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(note)?);
    } else {
        println!("Created note {} - {}", note.id, note.display_title());
    }

    print_warnings(&store);
    Ok(())
}

pub fn handle_show(ctx: &Context, id: String, json: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let note = store.resolve(&id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(note)?);
    } else {
        print!("{}", format_note(note));
    }

    Ok(())
}

pub fn handle_edit(
    ctx: &Context,
    id: String,
    title: Option<String>,
    content: Option<String>,
    stdin: bool,
    json: bool,
) -> Result<()> {
    let mut store = ctx.open_store()?;
    let id = store.resolve(&id)?.id.clone();

    let content = if stdin { Some(read_stdin()?) } else { content };
    if title.is_none() && content.is_none() {
        println!("Nothing to update. Pass --title, --content or --stdin.");
        return Ok(());
    }

    if let Some(title) = title {
        store.update_field(&id, NoteField::Title, title)?;
    }
    if let Some(content) = content {
        store.update_field(&id, NoteField::Content, content)?;
    }

    let note = lookup(&store, &id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(note)?);
    } else {
        println!("Updated note {} - {}", note.id, note.display_title());
    }

    print_warnings(&store);
    Ok(())
}

pub fn handle_delete(ctx: &Context, id: String, force: bool) -> Result<()> {
    let mut store = ctx.open_store()?;
    let note = store.resolve(&id)?.clone();

    // Confirm deletion unless --force is used
    if !force {
        eprint!("Delete note {} - {}? [y/N] ", note.id, note.display_title());

        if atty::is(atty::Stream::Stdin) {
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        } else {
            eprintln!();
            return Err(NotedeckError::ConfirmationRequired);
        }
    }

    store.delete(&note.id, None)?;
    println!("Deleted note {} - {}", note.id, note.display_title());

    Ok(())
}

pub fn handle_shell(ctx: &Context) -> Result<()> {
    let mut session = Session::open(ctx.store()?)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_shell(&mut session, stdin.lock(), stdout.lock())?;

    print_warnings(session.store());
    Ok(())
}

/// Local time of a millisecond timestamp, "-" when out of range.
pub(crate) fn format_timestamp(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub(crate) fn format_list_line(note: &Note) -> String {
    format!(
        "{}  {}  {}",
        note.id,
        format_timestamp(note.updated),
        note.display_title()
    )
}

pub(crate) fn format_note(note: &Note) -> String {
    let mut out = format!(
        "Note {}\nTitle: {}\nUpdated: {}\n",
        note.id,
        note.display_title(),
        format_timestamp(note.updated)
    );
    if !note.content.is_empty() {
        out.push('\n');
        out.push_str(&note.content);
        out.push('\n');
    }
    out
}

fn lookup<'a, S: KeyValueStore>(store: &'a NoteStore<S>, id: &str) -> Result<&'a Note> {
    store
        .get(id)
        .ok_or_else(|| NotedeckError::NoteNotFound(id.to_string()))
}

fn read_stdin() -> Result<String> {
    let mut content = String::new();
    io::stdin().read_to_string(&mut content)?;
    Ok(content)
}

fn print_warnings<S: KeyValueStore>(store: &NoteStore<S>) {
    for warning in check_thresholds(store.len(), store.payload_bytes()) {
        eprintln!("{}", format_warning(&warning));
    }
}
