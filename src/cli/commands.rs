use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "notedeck")]
#[command(version, about = "Local notes with search, stored in a JSON file or SQLite")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the notes and config.yaml (default: ~/.notedeck)
    #[arg(long, global = true, env = "NOTEDECK_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List notes, most recently updated first
    List {
        /// Only notes whose title or content contains this text (case-insensitive)
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new note
    New {
        /// Title for the note (default: "Untitled")
        #[arg(long, short = 't')]
        title: Option<String>,

        /// Read content from stdin
        #[arg(long)]
        stdin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single note
    Show {
        /// Note ID or unique ID prefix
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change the title or content of a note
    Edit {
        /// Note ID or unique ID prefix
        id: String,

        /// New title
        #[arg(long, short = 't')]
        title: Option<String>,

        /// New content
        #[arg(long, short = 'c', conflicts_with = "stdin")]
        content: Option<String>,

        /// Read new content from stdin
        #[arg(long)]
        stdin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a note
    Delete {
        /// Note ID or unique ID prefix
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Interactive session: select, edit and search notes
    Shell,
}
