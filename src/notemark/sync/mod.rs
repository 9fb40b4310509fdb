//! # Sync Engine
//!
//! One reconciliation pass sweeps the union of store notes and mirror
//! files, classifies every note via the change detector, and resolves each
//! according to its status: one-directional propagation when one side
//! changed, a three-way merge when both did, deletion propagation only when
//! the surviving side is untouched. Failures are isolated per note; only a
//! store-connection failure aborts a pass. The manifest is rewritten
//! atomically at pass end.
//!
//! Two passes must never run concurrently (both would read the same
//! fingerprints and double-apply edits), so a pass holds an advisory file
//! lock for its duration.

pub mod detect;
pub mod manifest;
pub mod mirror;
pub mod watch;

use crate::error::{NotemarkError, Result};
use crate::mergeable::MergeableText;
use crate::model::Note;
use crate::store::NoteStore;
use crate::structure;
use chrono::Utc;
use detect::{classify, fingerprint, SyncStatus};
use fs2::FileExt;
use manifest::{Manifest, ManifestEntry};
use mirror::{MirrorFile, MirrorHeader};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const LOCK_FILENAME: &str = ".notemark.lock";

/// Advisory lock serializing reconciliation passes over one sync root.
/// Released when dropped.
pub struct PassLock {
    _file: fs::File,
}

impl PassLock {
    pub fn acquire(root: &Path) -> Result<Self> {
        let path = root.join(LOCK_FILENAME);
        let file = fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(NotemarkError::Io)?;
        file.try_lock_exclusive()
            .map_err(|_| NotemarkError::SyncLocked(path.display().to_string()))?;
        Ok(Self { _file: file })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassAction {
    CreatedFile,
    CreatedNote,
    UpdatedFile,
    UpdatedNote,
    Merged,
    Conflicted,
    DeletedFile,
    DeletedNote,
    Unchanged,
    Skipped,
}

impl PassAction {
    pub fn label(&self) -> &'static str {
        match self {
            PassAction::CreatedFile => "file created",
            PassAction::CreatedNote => "note created",
            PassAction::UpdatedFile => "file updated",
            PassAction::UpdatedNote => "note updated",
            PassAction::Merged => "merged",
            PassAction::Conflicted => "conflict",
            PassAction::DeletedFile => "file deleted",
            PassAction::DeletedNote => "note deleted",
            PassAction::Unchanged => "unchanged",
            PassAction::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NoteReport {
    pub note_id: Option<Uuid>,
    pub title: String,
    pub action: PassAction,
    pub detail: Option<String>,
}

/// Structured end-of-pass summary. Conflicted and skipped notes surface
/// here rather than as errors so a pass always makes partial progress.
#[derive(Debug, Clone, Default)]
pub struct PassSummary {
    pub reports: Vec<NoteReport>,
}

impl PassSummary {
    fn push(&mut self, note_id: Option<Uuid>, title: &str, action: PassAction, detail: Option<String>) {
        self.reports.push(NoteReport {
            note_id,
            title: title.to_string(),
            action,
            detail,
        });
    }

    pub fn count(&self, action: PassAction) -> usize {
        self.reports.iter().filter(|r| r.action == action).count()
    }

    pub fn changed(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| !matches!(r.action, PassAction::Unchanged | PassAction::Skipped))
            .count()
    }

    pub fn conflicted(&self) -> Vec<&NoteReport> {
        self.reports
            .iter()
            .filter(|r| r.action == PassAction::Conflicted)
            .collect()
    }

    pub fn skipped(&self) -> Vec<&NoteReport> {
        self.reports
            .iter()
            .filter(|r| r.action == PassAction::Skipped)
            .collect()
    }

    pub fn one_line(&self) -> String {
        format!(
            "{} changed, {} conflicted, {} skipped, {} unchanged",
            self.changed() - self.count(PassAction::Conflicted),
            self.count(PassAction::Conflicted),
            self.count(PassAction::Skipped),
            self.count(PassAction::Unchanged),
        )
    }
}

/// Read-only classification of one note, for `sync status`.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub title: String,
    pub status: SyncStatus,
    pub diff: Option<String>,
}

/// One side's file state during a pass. The body is read lazily: when the
/// mirror file's mtime matches the manifest the stored fingerprint is
/// reused and the file is never opened.
struct FileState {
    rel_path: PathBuf,
    fingerprint: String,
    body: Option<String>,
    header: Option<MirrorHeader>,
    modified_at: Option<chrono::DateTime<Utc>>,
}

impl FileState {
    fn from_mirror(file: MirrorFile) -> Self {
        Self {
            fingerprint: fingerprint(&file.body),
            rel_path: file.rel_path,
            body: Some(file.body),
            header: file.header,
            modified_at: file.modified_at,
        }
    }

    fn body(&mut self, root: &Path) -> Result<&str> {
        if self.body.is_none() {
            let file = mirror::read(root, &self.rel_path)?;
            self.body = Some(file.body);
        }
        Ok(self.body.as_deref().unwrap())
    }
}

pub struct SyncEngine<'a, S: NoteStore> {
    store: &'a mut S,
    root: PathBuf,
    default_folder: String,
}

impl<'a, S: NoteStore> SyncEngine<'a, S> {
    pub fn new(store: &'a mut S, root: PathBuf, default_folder: String) -> Self {
        Self {
            store,
            root,
            default_folder,
        }
    }

    /// One full reconciliation pass.
    pub fn run_pass(&mut self) -> Result<PassSummary> {
        fs::create_dir_all(&self.root).map_err(NotemarkError::Io)?;
        let _lock = PassLock::acquire(&self.root)?;
        let mut manifest = Manifest::load(&self.root);
        let mut summary = PassSummary::default();

        // A store failure here is fatal for the pass; everything after is
        // isolated per note.
        let notes = self.store.list_notes(None)?;
        let mut notes_by_id: BTreeMap<Uuid, Note> =
            notes.into_iter().map(|n| (n.id, n)).collect();

        // Notes with undecodable bodies are skipped whole: their manifest
        // entries and mirror files stay untouched until they decode again.
        let mut poisoned: BTreeSet<Uuid> = BTreeSet::new();
        for (id, error) in self.store.undecodable_notes()? {
            warn!(note = %id, error = %error, "skipping undecodable note");
            summary.push(Some(id), &id.to_string(), PassAction::Skipped, Some(error));
            poisoned.insert(id);
        }

        let (mut files_by_id, orphans, mut taken) =
            self.scan_files(&manifest, &mut summary)?;

        let ids: BTreeSet<Uuid> = notes_by_id
            .keys()
            .chain(files_by_id.keys())
            .chain(manifest.entries.keys())
            .copied()
            .collect();

        for id in ids {
            if poisoned.contains(&id) {
                continue;
            }
            let note = notes_by_id.remove(&id);
            let file = files_by_id.remove(&id);
            let label = note
                .as_ref()
                .map(|n| n.title())
                .or_else(|| file.as_ref().map(|f| f.rel_path.display().to_string()))
                .unwrap_or_else(|| id.to_string());

            if let Err(e) = self.reconcile(id, note, file, &mut manifest, &mut taken, &mut summary)
            {
                warn!(note = %label, error = %e, "skipping note");
                summary.push(Some(id), &label, PassAction::Skipped, Some(e.to_string()));
            }
        }

        for orphan in orphans {
            let label = orphan.rel_path.display().to_string();
            if let Err(e) = self.adopt_file(orphan, &mut manifest, &mut summary) {
                warn!(file = %label, error = %e, "skipping file");
                summary.push(None, &label, PassAction::Skipped, Some(e.to_string()));
            }
        }

        manifest.save(&self.root)?;
        info!(root = %self.root.display(), "sync pass: {}", summary.one_line());
        Ok(summary)
    }

    /// Write every note to its mirror file unconditionally and rebuild the
    /// manifest from scratch. Initialization / disaster recovery path; no
    /// conflict detection by design.
    pub fn backup(&mut self) -> Result<PassSummary> {
        fs::create_dir_all(&self.root).map_err(NotemarkError::Io)?;
        let _lock = PassLock::acquire(&self.root)?;
        let mut summary = PassSummary::default();
        let mut manifest = Manifest::default();
        let mut taken: BTreeSet<PathBuf> = BTreeSet::new();

        let notes = self.store.list_notes(None)?;
        for note in notes {
            let title = note.title();
            if let Err(e) = self.export_note(&note, &mut manifest, &mut taken) {
                warn!(note = %title, error = %e, "skipping note");
                summary.push(Some(note.id), &title, PassAction::Skipped, Some(e.to_string()));
                continue;
            }
            summary.push(Some(note.id), &title, PassAction::CreatedFile, None);
        }

        manifest.save(&self.root)?;
        info!(root = %self.root.display(), notes = summary.count(PassAction::CreatedFile), "backup complete");
        Ok(summary)
    }

    /// Classify every note without writing anything. Diffs are unified
    /// patches against the last-synced snapshot.
    pub fn status(&mut self) -> Result<Vec<StatusReport>> {
        fs::create_dir_all(&self.root).map_err(NotemarkError::Io)?;
        let manifest = Manifest::load(&self.root);
        let mut summary = PassSummary::default();

        let notes = self.store.list_notes(None)?;
        let mut notes_by_id: BTreeMap<Uuid, Note> =
            notes.into_iter().map(|n| (n.id, n)).collect();
        let poisoned: BTreeSet<Uuid> = self
            .store
            .undecodable_notes()?
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        let (mut files_by_id, orphans, _taken) = self.scan_files(&manifest, &mut summary)?;

        let ids: BTreeSet<Uuid> = notes_by_id
            .keys()
            .chain(files_by_id.keys())
            .chain(manifest.entries.keys())
            .copied()
            .collect();

        let mut reports = Vec::new();
        for id in ids {
            if poisoned.contains(&id) {
                continue;
            }
            let note = notes_by_id.remove(&id);
            let mut file = files_by_id.remove(&id);
            let entry = manifest.entries.get(&id);

            let editable = note.as_ref().map(|n| n.body.to_editable().text);
            let note_fp = editable.as_deref().map(fingerprint);
            let file_fp = file.as_ref().map(|f| f.fingerprint.clone());

            let Some(status) = classify(note_fp.as_deref(), file_fp.as_deref(), entry) else {
                continue;
            };
            if status == SyncStatus::Unchanged {
                continue;
            }

            let title = note
                .as_ref()
                .map(|n| n.title())
                .or_else(|| file.as_ref().map(|f| f.rel_path.display().to_string()))
                .unwrap_or_else(|| id.to_string());

            let ancestor = entry.map(|e| e.last_synced_text.clone()).unwrap_or_default();
            let file_body = match (&status, file.as_mut()) {
                (SyncStatus::FileChanged | SyncStatus::BothChanged, Some(f)) => {
                    Some(f.body(&self.root)?.to_string())
                }
                _ => None,
            };
            let diff = match status {
                SyncStatus::NoteChanged => editable
                    .as_deref()
                    .map(|new| diffy::create_patch(&ancestor, new).to_string()),
                SyncStatus::FileChanged => file_body
                    .as_deref()
                    .map(|new| diffy::create_patch(&ancestor, new).to_string()),
                SyncStatus::BothChanged => {
                    let note_diff = editable
                        .as_deref()
                        .map(|new| diffy::create_patch(&ancestor, new).to_string())
                        .unwrap_or_default();
                    let file_diff = file_body
                        .as_deref()
                        .map(|new| diffy::create_patch(&ancestor, new).to_string())
                        .unwrap_or_default();
                    Some(format!("note side:\n{}file side:\n{}", note_diff, file_diff))
                }
                _ => None,
            };

            reports.push(StatusReport { title, status, diff });
        }

        for orphan in orphans {
            reports.push(StatusReport {
                title: orphan.rel_path.display().to_string(),
                status: SyncStatus::NewFile,
                diff: None,
            });
        }
        Ok(reports)
    }

    /// Read the mirror tree. Files whose mtime matches the manifest keep a
    /// lazy body; files without a usable header are returned separately.
    #[allow(clippy::type_complexity)]
    fn scan_files(
        &self,
        manifest: &Manifest,
        summary: &mut PassSummary,
    ) -> Result<(BTreeMap<Uuid, FileState>, Vec<MirrorFile>, BTreeSet<PathBuf>)> {
        let rel_paths = mirror::scan(&self.root)?;
        let by_path: BTreeMap<&Path, (&Uuid, &ManifestEntry)> = manifest
            .entries
            .iter()
            .map(|(id, e)| (e.file_path.as_path(), (id, e)))
            .collect();

        let mut files_by_id = BTreeMap::new();
        let mut orphans = Vec::new();
        let mut taken = BTreeSet::new();

        for rel in rel_paths {
            taken.insert(rel.clone());

            if let Some((id, entry)) = by_path.get(rel.as_path()) {
                let disk_mtime = mirror::mtime(&self.root.join(&rel));
                if entry.file_modified_at.is_some() && disk_mtime == entry.file_modified_at {
                    debug!(file = %rel.display(), "mtime unchanged, skipping read");
                    files_by_id.insert(
                        **id,
                        FileState {
                            rel_path: rel,
                            fingerprint: entry.file_fingerprint.clone(),
                            body: None,
                            header: None,
                            modified_at: disk_mtime,
                        },
                    );
                    continue;
                }
            }

            match mirror::read(&self.root, &rel) {
                Ok(file) => match &file.header {
                    Some(header) => {
                        files_by_id.insert(header.id, FileState::from_mirror(file));
                    }
                    None => orphans.push(file),
                },
                Err(e) => {
                    warn!(file = %rel.display(), error = %e, "unreadable mirror file");
                    summary.push(
                        None,
                        &rel.display().to_string(),
                        PassAction::Skipped,
                        Some(e.to_string()),
                    );
                }
            }
        }
        Ok((files_by_id, orphans, taken))
    }

    fn reconcile(
        &mut self,
        id: Uuid,
        note: Option<Note>,
        mut file: Option<FileState>,
        manifest: &mut Manifest,
        taken: &mut BTreeSet<PathBuf>,
        summary: &mut PassSummary,
    ) -> Result<()> {
        let entry = manifest.entries.get(&id).cloned();
        let editable = note.as_ref().map(|n| n.body.to_editable());
        let note_fp = editable.as_ref().map(|e| fingerprint(&e.text));
        let file_fp = file.as_ref().map(|f| f.fingerprint.clone());

        let Some(status) = classify(note_fp.as_deref(), file_fp.as_deref(), entry.as_ref()) else {
            // Nothing on either side; drop any stale entry.
            if manifest.entries.remove(&id).is_some() {
                debug!(%id, "both sides gone, dropping manifest entry");
            }
            return Ok(());
        };

        match status {
            SyncStatus::Unchanged => {
                let note = note.expect("unchanged requires a note");
                // Refresh bookkeeping when only metadata moved: a touched
                // mtime, or a file the user renamed without editing.
                if let (Some(entry), Some(file)) = (manifest.entries.get_mut(&id), &file) {
                    entry.file_modified_at = file.modified_at;
                    if entry.file_path != file.rel_path {
                        entry.file_path = file.rel_path.clone();
                    }
                }
                summary.push(Some(id), &note.title(), PassAction::Unchanged, None);
            }

            SyncStatus::NewNote => {
                let note = note.expect("new note requires a note");
                let editable = editable.expect("new note requires a body");
                // The previous mirror path (if any) is gone; derive afresh.
                let rel = mirror::path_for(
                    &note.title(),
                    &id,
                    &note.folder,
                    &self.default_folder,
                    taken,
                );
                self.write_mirror(&note, &editable.text, &rel, manifest)?;
                taken.insert(rel);
                summary.push(Some(id), &note.title(), PassAction::CreatedFile, None);
            }

            SyncStatus::NewFile => {
                let file = file.take().expect("new file requires a file");
                manifest.entries.remove(&id);
                self.adopt_file_state(file, manifest, summary)?;
            }

            SyncStatus::NoteChanged => {
                let note = note.expect("note changed requires a note");
                let editable = editable.expect("note changed requires a body");
                let file = file.as_ref().expect("note changed requires a file");

                // Re-derive the mirror path so a title edit renames the file.
                let mut rel = file.rel_path.clone();
                let mut without_current = taken.clone();
                without_current.remove(&rel);
                let desired = mirror::path_for(
                    &note.title(),
                    &id,
                    &note.folder,
                    &self.default_folder,
                    &without_current,
                );
                if desired != rel {
                    mirror::remove(&self.root, &rel)?;
                    taken.remove(&rel);
                    rel = desired;
                }

                self.write_mirror(&note, &editable.text, &rel, manifest)?;
                taken.insert(rel);
                summary.push(Some(id), &note.title(), PassAction::UpdatedFile, None);
            }

            SyncStatus::FileChanged => {
                let mut note = note.expect("file changed requires a note");
                let entry = entry.expect("file changed requires an entry");
                let file = file.as_mut().expect("file changed requires a file");
                let body = file.body(&self.root)?.to_string();

                note.body.apply_edit(&entry.last_synced_text, &body);
                note.touch();
                self.store.update_note(&note)?;

                // Re-canonicalize the file when encode/decode renumbered
                // placeholder ordinals.
                let new_editable = note.body.to_editable();
                let rel = file.rel_path.clone();
                if new_editable.text != body {
                    self.write_mirror(&note, &new_editable.text, &rel, manifest)?;
                } else {
                    self.record_entry(&note, &new_editable.text, &rel, manifest)?;
                }
                summary.push(Some(id), &note.title(), PassAction::UpdatedNote, None);
            }

            SyncStatus::BothChanged => {
                let mut note = note.expect("both changed requires a note");
                let file = file.as_mut().expect("both changed requires a file");
                let body = file.body(&self.root)?.to_string();
                let ancestor = entry
                    .as_ref()
                    .map(|e| e.last_synced_text.clone())
                    .unwrap_or_default();

                let merged = note.body.merge_snapshot(&ancestor, &body);
                note.touch();
                self.store.update_note(&note)?;
                let rel = file.rel_path.clone();

                if merged.is_clean() {
                    let new_editable = note.body.to_editable();
                    self.write_mirror(&note, &new_editable.text, &rel, manifest)?;
                    summary.push(Some(id), &note.title(), PassAction::Merged, None);
                } else {
                    // Both hunks go to the mirror file between conflict
                    // markers; the note keeps the side that resolved. The
                    // manifest entry is left alone so the next pass sees
                    // this note again.
                    let annotated = merged.annotated_text("notes", "file");
                    let header = self.header_for(&note, &annotated);
                    mirror::write(&self.root, &rel, &header, &annotated)?;
                    let conflicts = merged.conflict_count();
                    info!(note = %note.title(), conflicts, "merge conflict");
                    summary.push(
                        Some(id),
                        &note.title(),
                        PassAction::Conflicted,
                        Some(format!(
                            "{} conflicting region{}",
                            conflicts,
                            if conflicts == 1 { "" } else { "s" }
                        )),
                    );
                }
            }

            SyncStatus::DeletedNote => {
                let file = file.expect("deleted note requires a file");
                mirror::remove(&self.root, &file.rel_path)?;
                taken.remove(&file.rel_path);
                manifest.entries.remove(&id);
                summary.push(
                    Some(id),
                    &file.rel_path.display().to_string(),
                    PassAction::DeletedFile,
                    None,
                );
            }

            SyncStatus::DeletedFile => {
                let note = note.expect("deleted file requires a note");
                let title = note.title();
                self.store.delete_note(&id)?;
                manifest.entries.remove(&id);
                summary.push(Some(id), &title, PassAction::DeletedNote, None);
            }
        }
        Ok(())
    }

    /// Create a store note from a mirror file and adopt the file (rewrite
    /// with the new note's header, record a manifest entry).
    fn adopt_file(
        &mut self,
        file: MirrorFile,
        manifest: &mut Manifest,
        summary: &mut PassSummary,
    ) -> Result<()> {
        let folder = file
            .header
            .as_ref()
            .map(|h| h.folder.clone())
            .unwrap_or_else(|| mirror::implied_folder(&file.rel_path, &self.default_folder));
        let note = self
            .store
            .create_note(&folder, MergeableText::from_plain_text(&file.body))?;

        let editable = note.body.to_editable();
        self.write_mirror(&note, &editable.text, &file.rel_path, manifest)?;
        summary.push(Some(note.id), &note.title(), PassAction::CreatedNote, None);
        Ok(())
    }

    fn adopt_file_state(
        &mut self,
        mut file: FileState,
        manifest: &mut Manifest,
        summary: &mut PassSummary,
    ) -> Result<()> {
        let body = file.body(&self.root)?.to_string();
        self.adopt_file(
            MirrorFile {
                rel_path: file.rel_path,
                header: file.header,
                body,
                modified_at: file.modified_at,
            },
            manifest,
            summary,
        )
    }

    fn export_note(
        &mut self,
        note: &Note,
        manifest: &mut Manifest,
        taken: &mut BTreeSet<PathBuf>,
    ) -> Result<()> {
        let editable = note.body.to_editable();
        let rel = mirror::path_for(
            &note.title(),
            &note.id,
            &note.folder,
            &self.default_folder,
            taken,
        );
        self.write_mirror(note, &editable.text, &rel, manifest)?;
        taken.insert(rel);
        Ok(())
    }

    fn header_for(&self, note: &Note, body: &str) -> MirrorHeader {
        MirrorHeader {
            id: note.id,
            folder: note.folder.clone(),
            tags: structure::extract_tags(body),
        }
    }

    /// Write the mirror file and record the fresh manifest entry.
    fn write_mirror(
        &self,
        note: &Note,
        editable_text: &str,
        rel: &Path,
        manifest: &mut Manifest,
    ) -> Result<()> {
        let header = self.header_for(note, editable_text);
        mirror::write(&self.root, rel, &header, editable_text)?;
        self.record_entry(note, editable_text, rel, manifest)
    }

    fn record_entry(
        &self,
        note: &Note,
        editable_text: &str,
        rel: &Path,
        manifest: &mut Manifest,
    ) -> Result<()> {
        let fp = fingerprint(editable_text);
        manifest.entries.insert(
            note.id,
            ManifestEntry {
                file_path: rel.to_path_buf(),
                note_fingerprint: fp.clone(),
                file_fingerprint: fp,
                last_synced_text: editable_text.to_string(),
                last_synced_at: Utc::now(),
                file_modified_at: mirror::mtime(&self.root.join(rel)),
            },
        );
        Ok(())
    }
}
