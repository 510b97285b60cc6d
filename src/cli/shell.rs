use std::io::{BufRead, Write};

use crate::entity::NoteField;
use crate::error::{NotedeckError, Result};
use crate::session::Session;
use crate::storage::KeyValueStore;

use super::handlers::{format_list_line, format_note};

const HELP: &str = "\
Commands:
  ls                  list notes matching the current search
  search [TEXT]       filter the list (no text clears the search)
  new                 create a note and open it
  open ID             open a note (ID or unique prefix)
  title TEXT          set the title of the open note
  body TEXT           set the content of the open note (\\n for newlines)
  set FIELD TEXT      set title or content of the open note
  show                print the open note
  delete              delete the open note (asks first)
  sidebar             toggle the sidebar
  help                this text
  quit                leave the shell
";

const EMPTY_EDITOR: &str = "Select a note or create a new one to begin.";

/// Read commands from `input` until EOF or `quit`, writing replies to `output`.
///
/// Command errors (unknown id, bad field) are reported and the loop carries
/// on; only I/O failures on `output` end the session early.
pub fn run_shell<S, R, W>(session: &mut Session<S>, mut input: R, mut output: W) -> Result<()>
where
    S: KeyValueStore,
    R: BufRead,
    W: Write,
{
    writeln!(output, "notedeck shell. Type 'help' for commands.")?;

    loop {
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }
        let line = line.trim_end_matches(['\n', '\r']);
        let (command, rest) = split_command(line);

        let result = match command {
            "" => Ok(()),
            "quit" | "exit" | "q" => break,
            "help" | "?" => write!(output, "{}", HELP).map_err(Into::into),
            "ls" | "list" => list(session, &mut output),
            "search" => {
                session.set_search(rest);
                list(session, &mut output)
            }
            "new" => session
                .create()
                .and_then(|id| writeln!(output, "Created note {}", id).map_err(Into::into)),
            "open" | "select" => open(session, rest, &mut output),
            "title" => edit(session, NoteField::Title, rest, &mut output),
            "body" | "content" => edit(session, NoteField::Content, rest, &mut output),
            "set" => {
                let (field, value) = split_command(rest);
                match field.parse::<NoteField>() {
                    Ok(field) => edit(session, field, value, &mut output),
                    Err(_) => Err(NotedeckError::InvalidField(field.to_string())),
                }
            }
            "show" => show(session, &mut output),
            "delete" | "rm" => delete(session, &mut input, &mut output),
            "sidebar" => {
                session.toggle_sidebar();
                let state = if session.view().sidebar_open {
                    "open"
                } else {
                    "closed"
                };
                writeln!(output, "Sidebar {}", state).map_err(Into::into)
            }
            other => writeln!(output, "Unknown command '{}'. Type 'help'.", other)
                .map_err(Into::into),
        };

        match result {
            Ok(()) => {}
            Err(NotedeckError::Io(e)) => return Err(NotedeckError::Io(e)),
            Err(e) => writeln!(output, "Error: {}", e)?,
        }
    }

    Ok(())
}

fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim_start();
    match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim_start()),
        None => (line, ""),
    }
}

fn list<S: KeyValueStore, W: Write>(session: &Session<S>, output: &mut W) -> Result<()> {
    let notes = session.visible_notes();
    if notes.is_empty() {
        writeln!(output, "No notes found")?;
        return Ok(());
    }

    let selected = session.view().selected_id.as_deref();
    for note in notes {
        let marker = if Some(note.id.as_str()) == selected {
            '*'
        } else {
            ' '
        };
        writeln!(output, "{} {}", marker, format_list_line(note))?;
    }
    Ok(())
}

fn open<S: KeyValueStore, W: Write>(
    session: &mut Session<S>,
    id: &str,
    output: &mut W,
) -> Result<()> {
    let id = session.store().resolve(id.trim())?.id.clone();
    session.select(&id);
    show(session, output)
}

fn edit<S: KeyValueStore, W: Write>(
    session: &mut Session<S>,
    field: NoteField,
    value: &str,
    output: &mut W,
) -> Result<()> {
    let value = value.replace("\\n", "\n");
    if session.edit(field, value)? {
        writeln!(output, "Saved {}", field)?;
    } else {
        writeln!(output, "No note open. Use 'new' or 'open ID'.")?;
    }
    Ok(())
}

fn show<S: KeyValueStore, W: Write>(session: &Session<S>, output: &mut W) -> Result<()> {
    match session.selected_note() {
        Some(note) => write!(output, "{}", format_note(note))?,
        None => writeln!(output, "{}", EMPTY_EDITOR)?,
    }
    Ok(())
}

fn delete<S, R, W>(session: &mut Session<S>, input: &mut R, output: &mut W) -> Result<()>
where
    S: KeyValueStore,
    R: BufRead,
    W: Write,
{
    let Some(id) = session.view().selected_id.clone() else {
        writeln!(output, "No note open.")?;
        return Ok(());
    };

    let mut prompt_failed = None;
    let mut ask = |prompt: &str| -> bool {
        let mut answer = String::new();
        let asked = write!(output, "{} [y/N] ", prompt)
            .and_then(|_| output.flush())
            .and_then(|_| input.read_line(&mut answer));
        match asked {
            Ok(_) => answer.trim().eq_ignore_ascii_case("y"),
            Err(e) => {
                prompt_failed = Some(e);
                false
            }
        }
    };

    let removed = session.delete(&id, &mut ask)?;
    if let Some(e) = prompt_failed {
        return Err(e.into());
    }

    if removed {
        writeln!(output, "Deleted note {}", id)?;
        match session.view().selected_id.as_deref() {
            Some(next) => writeln!(output, "Opened {}", next)?,
            None => writeln!(output, "{}", EMPTY_EDITOR)?,
        }
    } else {
        writeln!(output, "Cancelled.")?;
    }
    Ok(())
}
