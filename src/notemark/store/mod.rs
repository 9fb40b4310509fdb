//! # Storage Layer
//!
//! The [`NoteStore`] trait is the single handle every core operation takes
//! to reach the persistent note store; nothing in the core performs raw
//! persistence I/O itself, and there is no ambient store state.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: production JSON-backed store
//!   - Metadata for all notes in `index.json`
//!   - Each body's unit stream in `note-{uuid}.json`
//! - [`memory::InMemoryStore`]: in-memory fake for tests
//!
//! Keeping the store behind a trait is what lets the sync engine, the
//! command layer, and the merge paths run against an in-memory store in
//! tests without touching a filesystem.

use crate::error::Result;
use crate::model::{Folder, Note};
use uuid::Uuid;

pub mod fs;
pub mod memory;

/// Handle to the persistent note store.
pub trait NoteStore {
    /// All notes, optionally restricted to one folder (exact name).
    fn list_notes(&self, folder: Option<&str>) -> Result<Vec<Note>>;

    /// Fetch one note by id.
    fn get_note(&self, id: &Uuid) -> Result<Note>;

    /// Create a note in the given folder (created on first use) from a
    /// fully-formed body.
    fn create_note(&mut self, folder: &str, body: crate::mergeable::MergeableText) -> Result<Note>;

    /// Persist an updated note (body and metadata).
    fn update_note(&mut self, note: &Note) -> Result<()>;

    /// Delete a note permanently.
    fn delete_note(&mut self, id: &Uuid) -> Result<()>;

    /// Resolve a folder by name, exact match first, then case-insensitive.
    fn resolve_folder(&self, name: &str) -> Result<Folder>;

    /// All folders that currently hold at least one note, plus any created
    /// explicitly.
    fn list_folders(&self) -> Result<Vec<Folder>>;

    /// Notes that exist but whose bodies cannot be decoded, with the decode
    /// error. [`NoteStore::list_notes`] omits them; reconciliation must
    /// skip them rather than treat the omission as a deletion.
    fn undecodable_notes(&self) -> Result<Vec<(Uuid, String)>> {
        Ok(Vec::new())
    }
}
