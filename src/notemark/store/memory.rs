use super::NoteStore;
use crate::error::{NotemarkError, Result};
use crate::mergeable::MergeableText;
use crate::model::{Folder, Note};
use std::collections::BTreeMap;
use uuid::Uuid;

/// In-memory store for tests. Does NOT persist anything.
#[derive(Default)]
pub struct InMemoryStore {
    notes: BTreeMap<Uuid, Note>,
    folders: Vec<String>,
    /// When set, every operation fails as if the store were unreachable.
    pub unavailable: bool,
    /// Note ids whose bodies pretend to be undecodable.
    pub poisoned: Vec<Uuid>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(NotemarkError::StoreUnavailable(
                "simulated outage".to_string(),
            ));
        }
        Ok(())
    }

    fn remember_folder(&mut self, folder: &str) {
        if !self.folders.iter().any(|f| f == folder) {
            self.folders.push(folder.to_string());
        }
    }
}

impl NoteStore for InMemoryStore {
    fn list_notes(&self, folder: Option<&str>) -> Result<Vec<Note>> {
        self.check_available()?;
        Ok(self
            .notes
            .values()
            .filter(|n| folder.map(|f| n.folder == f).unwrap_or(true))
            .filter(|n| !self.poisoned.contains(&n.id))
            .cloned()
            .collect())
    }

    fn get_note(&self, id: &Uuid) -> Result<Note> {
        self.check_available()?;
        self.notes
            .get(id)
            .cloned()
            .ok_or(NotemarkError::NoteNotFound(*id))
    }

    fn create_note(&mut self, folder: &str, body: MergeableText) -> Result<Note> {
        self.check_available()?;
        let note = Note::new(folder, body);
        self.remember_folder(folder);
        self.notes.insert(note.id, note.clone());
        Ok(note)
    }

    fn update_note(&mut self, note: &Note) -> Result<()> {
        self.check_available()?;
        if !self.notes.contains_key(&note.id) {
            return Err(NotemarkError::NoteNotFound(note.id));
        }
        self.remember_folder(&note.folder);
        self.notes.insert(note.id, note.clone());
        Ok(())
    }

    fn delete_note(&mut self, id: &Uuid) -> Result<()> {
        self.check_available()?;
        if self.notes.remove(id).is_none() {
            return Err(NotemarkError::NoteNotFound(*id));
        }
        Ok(())
    }

    fn resolve_folder(&self, name: &str) -> Result<Folder> {
        self.check_available()?;
        if self.folders.iter().any(|f| f == name) {
            return Ok(Folder::new(name));
        }
        self.folders
            .iter()
            .find(|f| f.eq_ignore_ascii_case(name))
            .map(|f| Folder::new(f.clone()))
            .ok_or_else(|| NotemarkError::FolderNotFound(name.to_string()))
    }

    fn list_folders(&self) -> Result<Vec<Folder>> {
        self.check_available()?;
        let mut names = self.folders.clone();
        names.sort();
        Ok(names.into_iter().map(Folder::new).collect())
    }

    fn undecodable_notes(&self) -> Result<Vec<(Uuid, String)>> {
        self.check_available()?;
        Ok(self
            .poisoned
            .iter()
            .filter(|id| self.notes.contains_key(id))
            .map(|id| (*id, "malformed unit stream".to_string()))
            .collect())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::DEFAULT_FOLDER;

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn with_note(mut self, text: &str) -> Self {
            self.store
                .create_note(DEFAULT_FOLDER, MergeableText::from_plain_text(text))
                .unwrap();
            self
        }

        pub fn with_note_in(mut self, folder: &str, text: &str) -> Self {
            self.store
                .create_note(folder, MergeableText::from_plain_text(text))
                .unwrap();
            self
        }

        pub fn with_pinned_note(mut self, text: &str) -> Self {
            let mut note = self
                .store
                .create_note(DEFAULT_FOLDER, MergeableText::from_plain_text(text))
                .unwrap();
            note.is_pinned = true;
            self.store.update_note(&note).unwrap();
            self
        }
    }
}
