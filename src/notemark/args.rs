use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "notemark", version)]
#[command(about = "Keep a note store and a directory of Markdown files in sync", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Work with notes
    #[command(subcommand, alias = "n")]
    Notes(NotesCommand),

    /// List folders
    Folders {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Synchronize notes with the mirror directory
    #[command(subcommand, alias = "s")]
    Sync(SyncCommand),
}

#[derive(Subcommand, Debug)]
pub enum NotesCommand {
    /// List notes
    #[command(alias = "ls")]
    List {
        /// Only notes in this folder
        #[arg(short, long)]
        folder: Option<String>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print a note
    #[command(alias = "v")]
    View {
        /// Index of the note (e.g. 1 or p1)
        index: String,

        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Create a note
    #[command(alias = "a")]
    Add {
        /// Folder for the new note
        #[arg(short, long)]
        folder: Option<String>,

        /// Note text; opens $EDITOR when omitted
        text: Option<String>,
    },

    /// Edit a note in $EDITOR
    #[command(alias = "e")]
    Edit {
        /// Index of the note (e.g. 1 or p1)
        index: String,
    },

    /// Find and replace literal text in a note
    Replace {
        index: String,
        find: String,
        replace: String,
    },

    /// Delete a note
    #[command(alias = "rm")]
    Delete { index: String },

    /// Move a note to another folder
    #[command(alias = "mv")]
    Move { index: String, folder: String },

    /// Search note titles and bodies
    Search { query: String },

    /// Pin a note to the top of listings
    Pin { index: String },

    /// Unpin a note
    Unpin { index: String },

    /// Toggle a checklist item
    Check {
        index: String,

        /// Checklist item number (1-based); omit to list items
        item: Option<usize>,

        /// Mark the item not-done instead
        #[arg(long)]
        undo: bool,
    },

    /// Print a Markdown table from a note
    Table {
        index: String,

        /// Which table (1-based)
        #[arg(default_value_t = 1)]
        number: usize,
    },

    /// List tags of a note, or of every note
    Tags {
        /// Index of a note; omit for a store-wide census
        index: Option<String>,
    },

    /// List notes linking to a title
    Backlinks { title: String },

    /// List attachments of a note
    Attachments {
        index: String,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Attach a file reference to a note
    Attach {
        index: String,

        /// File to attach (the name is recorded)
        file: PathBuf,

        /// Position among existing attachments (1-based; appends otherwise)
        #[arg(long)]
        at: Option<usize>,
    },

    /// Remove an attachment from a note
    Detach {
        index: String,

        /// Attachment number as shown by `attachments` (1-based)
        attachment: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum SyncCommand {
    /// Export every note to its mirror file, rebuilding the manifest
    Backup {
        /// Sync root (defaults to the configured directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Run one reconciliation pass
    Run {
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Reconcile continuously on an interval
    Watch {
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Seconds between passes
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Show what a pass would do, with diffs
    Status {
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}
