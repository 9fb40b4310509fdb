use super::NoteStore;
use crate::error::{NotemarkError, Result};
use crate::mergeable::MergeableText;
use crate::model::{Folder, Note};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

const INDEX_FILENAME: &str = "index.json";

/// Per-note record in `index.json`. Bodies live in separate files so
/// listing metadata does not deserialize every unit stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NoteRecord {
    folder: String,
    is_pinned: bool,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Index {
    notes: BTreeMap<Uuid, NoteRecord>,
    #[serde(default)]
    folders: Vec<String>,
}

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn note_path(&self, id: &Uuid) -> PathBuf {
        self.root.join(format!("note-{}.json", id))
    }

    fn load_index(&self) -> Result<Index> {
        let path = self.root.join(INDEX_FILENAME);
        if !path.exists() {
            return Ok(Index::default());
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| NotemarkError::StoreUnavailable(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| NotemarkError::StoreUnavailable(format!("{}: {}", path.display(), e)))
    }

    fn save_index(&self, index: &Index) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(NotemarkError::Io)?;
        let content = serde_json::to_string_pretty(index).map_err(NotemarkError::Serialization)?;
        fs::write(self.root.join(INDEX_FILENAME), content).map_err(NotemarkError::Io)?;
        Ok(())
    }

    fn load_body(&self, id: &Uuid) -> Result<MergeableText> {
        let path = self.note_path(id);
        if !path.exists() {
            return Ok(MergeableText::default());
        }
        let content = fs::read_to_string(&path).map_err(NotemarkError::Io)?;
        serde_json::from_str(&content)
            .map_err(|e| NotemarkError::Decode(format!("{}: {}", path.display(), e)))
    }

    fn save_body(&self, id: &Uuid, body: &MergeableText) -> Result<()> {
        let content = serde_json::to_string(body).map_err(NotemarkError::Serialization)?;
        fs::write(self.note_path(id), content).map_err(NotemarkError::Io)?;
        Ok(())
    }

    fn assemble(&self, id: Uuid, record: &NoteRecord) -> Result<Note> {
        Ok(Note {
            id,
            folder: record.folder.clone(),
            body: self.load_body(&id)?,
            is_pinned: record.is_pinned,
            created_at: record.created_at,
            modified_at: record.modified_at,
        })
    }
}

impl NoteStore for FileStore {
    fn list_notes(&self, folder: Option<&str>) -> Result<Vec<Note>> {
        let index = self.load_index()?;
        let mut notes = Vec::new();
        for (id, record) in &index.notes {
            if let Some(filter) = folder {
                if record.folder != filter {
                    continue;
                }
            }
            // A note with an unreadable body is omitted here and surfaced
            // through undecodable_notes; it must never look deleted.
            match self.assemble(*id, record) {
                Ok(note) => notes.push(note),
                Err(e) => warn!(note = %id, error = %e, "skipping undecodable note"),
            }
        }
        Ok(notes)
    }

    fn get_note(&self, id: &Uuid) -> Result<Note> {
        let index = self.load_index()?;
        let record = index.notes.get(id).ok_or(NotemarkError::NoteNotFound(*id))?;
        self.assemble(*id, record)
    }

    fn create_note(&mut self, folder: &str, body: MergeableText) -> Result<Note> {
        let mut index = self.load_index()?;
        let note = Note::new(folder, body);
        index.notes.insert(
            note.id,
            NoteRecord {
                folder: note.folder.clone(),
                is_pinned: note.is_pinned,
                created_at: note.created_at,
                modified_at: note.modified_at,
            },
        );
        if !index.folders.iter().any(|f| f == folder) {
            index.folders.push(folder.to_string());
        }
        self.save_index(&index)?;
        self.save_body(&note.id, &note.body)?;
        Ok(note)
    }

    fn update_note(&mut self, note: &Note) -> Result<()> {
        let mut index = self.load_index()?;
        if !index.notes.contains_key(&note.id) {
            return Err(NotemarkError::NoteNotFound(note.id));
        }
        index.notes.insert(
            note.id,
            NoteRecord {
                folder: note.folder.clone(),
                is_pinned: note.is_pinned,
                created_at: note.created_at,
                modified_at: note.modified_at,
            },
        );
        if !index.folders.iter().any(|f| f == &note.folder) {
            index.folders.push(note.folder.clone());
        }
        self.save_index(&index)?;
        self.save_body(&note.id, &note.body)?;
        Ok(())
    }

    fn delete_note(&mut self, id: &Uuid) -> Result<()> {
        let mut index = self.load_index()?;
        if index.notes.remove(id).is_none() {
            return Err(NotemarkError::NoteNotFound(*id));
        }
        self.save_index(&index)?;
        let path = self.note_path(id);
        if path.exists() {
            fs::remove_file(path).map_err(NotemarkError::Io)?;
        }
        Ok(())
    }

    fn resolve_folder(&self, name: &str) -> Result<Folder> {
        let index = self.load_index()?;
        if index.folders.iter().any(|f| f == name) {
            return Ok(Folder::new(name));
        }
        index
            .folders
            .iter()
            .find(|f| f.eq_ignore_ascii_case(name))
            .map(|f| Folder::new(f.clone()))
            .ok_or_else(|| NotemarkError::FolderNotFound(name.to_string()))
    }

    fn list_folders(&self) -> Result<Vec<Folder>> {
        let index = self.load_index()?;
        let mut names = index.folders.clone();
        names.sort();
        Ok(names.into_iter().map(Folder::new).collect())
    }

    fn undecodable_notes(&self) -> Result<Vec<(Uuid, String)>> {
        let index = self.load_index()?;
        let mut broken = Vec::new();
        for (id, record) in &index.notes {
            if let Err(e) = self.assemble(*id, record) {
                broken.push((*id, e.to_string()));
            }
        }
        Ok(broken)
    }
}
