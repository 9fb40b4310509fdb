//! # API Facade
//!
//! Thin entry point over the command layer: parses display indexes into
//! note ids, dispatches to the right command, and returns structured
//! results. No business logic, no I/O, no printing: any client (the CLI,
//! a future server) drives the same surface.
//!
//! Generic over [`NoteStore`], so the whole API runs against the in-memory
//! store in tests.

use crate::commands::{self, CmdResult};
use crate::error::Result;
use crate::index::DisplayIndex;
use crate::store::NoteStore;
use crate::sync::{PassSummary, StatusReport, SyncEngine};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use uuid::Uuid;

pub struct NotemarkApi<S: NoteStore> {
    store: S,
}

impl<S: NoteStore> NotemarkApi<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn resolve(&self, index: &str) -> Result<Uuid> {
        let parsed: DisplayIndex = index.parse()?;
        commands::helpers::resolve_index(&self.store, parsed)
    }

    // --- notes ---

    pub fn create_note(&mut self, folder: Option<&str>, text: &str) -> Result<CmdResult> {
        commands::create::run(&mut self.store, folder, text)
    }

    pub fn list_notes(&self, folder: Option<&str>) -> Result<CmdResult> {
        commands::list::run(&self.store, folder)
    }

    pub fn list_folders(&self) -> Result<CmdResult> {
        commands::list::folders(&self.store)
    }

    pub fn view_note(&self, index: &str) -> Result<CmdResult> {
        let parsed: DisplayIndex = index.parse()?;
        commands::view::run(&self.store, parsed)
    }

    /// Apply an editor session's outcome to a note fetched earlier via
    /// [`Self::view_note`].
    pub fn update_note(&mut self, id: Uuid, old_text: &str, new_text: &str) -> Result<CmdResult> {
        commands::update::run(&mut self.store, id, old_text, new_text)
    }

    pub fn replace_in_note(&mut self, index: &str, find: &str, replace: &str) -> Result<CmdResult> {
        let id = self.resolve(index)?;
        commands::update::replace(&mut self.store, id, find, replace)
    }

    pub fn delete_note(&mut self, index: &str) -> Result<CmdResult> {
        let id = self.resolve(index)?;
        commands::delete::run(&mut self.store, id)
    }

    pub fn move_note(&mut self, index: &str, folder: &str) -> Result<CmdResult> {
        let id = self.resolve(index)?;
        commands::mv::run(&mut self.store, id, folder)
    }

    pub fn search_notes(&self, query: &str) -> Result<CmdResult> {
        commands::search::run(&self.store, query)
    }

    pub fn pin_note(&mut self, index: &str) -> Result<CmdResult> {
        let id = self.resolve(index)?;
        commands::pinning::pin(&mut self.store, id)
    }

    pub fn unpin_note(&mut self, index: &str) -> Result<CmdResult> {
        let id = self.resolve(index)?;
        commands::pinning::unpin(&mut self.store, id)
    }

    // --- structure ---

    pub fn checklist(&self, index: &str) -> Result<CmdResult> {
        let id = self.resolve(index)?;
        commands::checklist::items(&self.store, id)
    }

    pub fn set_checklist_item(&mut self, index: &str, item: usize, done: bool) -> Result<CmdResult> {
        let id = self.resolve(index)?;
        commands::checklist::set(&mut self.store, id, item, done)
    }

    pub fn table(&self, index: &str, number: usize) -> Result<CmdResult> {
        let id = self.resolve(index)?;
        commands::table::run(&self.store, id, number)
    }

    pub fn note_tags(&self, index: &str) -> Result<CmdResult> {
        let id = self.resolve(index)?;
        commands::tags::of_note(&self.store, id)
    }

    pub fn tag_census(&self) -> Result<CmdResult> {
        commands::tags::census(&self.store)
    }

    pub fn backlinks(&self, title: &str) -> Result<CmdResult> {
        commands::links::backlinks(&self.store, title)
    }

    // --- attachments ---

    pub fn attachments(&self, index: &str) -> Result<CmdResult> {
        let id = self.resolve(index)?;
        commands::attach::list(&self.store, id)
    }

    pub fn attach(&mut self, index: &str, name: &str, at: Option<usize>) -> Result<CmdResult> {
        let id = self.resolve(index)?;
        commands::attach::attach(&mut self.store, id, name, at)
    }

    pub fn detach(&mut self, index: &str, number: usize) -> Result<CmdResult> {
        let id = self.resolve(index)?;
        commands::attach::detach(&mut self.store, id, number)
    }

    // --- sync ---

    pub fn sync_backup(&mut self, root: &Path, default_folder: &str) -> Result<PassSummary> {
        SyncEngine::new(&mut self.store, root.to_path_buf(), default_folder.to_string()).backup()
    }

    pub fn sync_run(&mut self, root: &Path, default_folder: &str) -> Result<PassSummary> {
        SyncEngine::new(&mut self.store, root.to_path_buf(), default_folder.to_string()).run_pass()
    }

    pub fn sync_status(&mut self, root: &Path, default_folder: &str) -> Result<Vec<StatusReport>> {
        SyncEngine::new(&mut self.store, root.to_path_buf(), default_folder.to_string()).status()
    }

    pub fn sync_watch<F>(
        &mut self,
        root: &Path,
        default_folder: &str,
        interval: Duration,
        stop: &AtomicBool,
        on_pass: F,
    ) -> usize
    where
        F: FnMut(&Result<PassSummary>),
    {
        crate::sync::watch::run(&mut self.store, root, default_folder, interval, stop, on_pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use tempfile::tempdir;

    fn api_with_note(text: &str) -> NotemarkApi<InMemoryStore> {
        let mut api = NotemarkApi::new(InMemoryStore::new());
        api.create_note(None, text).unwrap();
        api
    }

    #[test]
    fn test_view_then_update_round_trip() {
        let mut api = api_with_note("Title\nbody\n");
        let viewed = api.view_note("1").unwrap();
        let id = viewed.affected_notes[0].id;
        let old = viewed.body_text.unwrap();

        api.update_note(id, &old, "Title\nedited\n").unwrap();
        let again = api.view_note("1").unwrap();
        assert_eq!(again.body_text.as_deref(), Some("Title\nedited\n"));
    }

    #[test]
    fn test_invalid_index_is_an_api_error() {
        let api = api_with_note("Title\n");
        assert!(api.view_note("zzz").is_err());
        assert!(api.view_note("7").is_err());
    }

    #[test]
    fn test_sync_run_creates_mirror_files() {
        let dir = tempdir().unwrap();
        let mut api = api_with_note("Synced note\ncontent\n");
        let summary = api.sync_run(dir.path(), "Notes").unwrap();
        assert_eq!(summary.count(crate::sync::PassAction::CreatedFile), 1);
        assert!(dir.path().join("Synced note.md").exists());
    }
}
