//! Change detection: content fingerprints and per-note classification.
//!
//! A fingerprint is a SHA-256 over the content, not a modification time;
//! mtimes are only ever a short-circuit to skip re-hashing, never the
//! source of truth.

use super::manifest::ManifestEntry;
use sha2::{Digest, Sha256};

/// Hex SHA-256 of the given text.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    bytes_to_hex(&digest)
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Where a note stands relative to its last-synced state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Unchanged,
    NoteChanged,
    FileChanged,
    BothChanged,
    NewNote,
    NewFile,
    DeletedNote,
    DeletedFile,
}

impl SyncStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SyncStatus::Unchanged => "unchanged",
            SyncStatus::NoteChanged => "note changed",
            SyncStatus::FileChanged => "file changed",
            SyncStatus::BothChanged => "both changed",
            SyncStatus::NewNote => "new note",
            SyncStatus::NewFile => "new file",
            SyncStatus::DeletedNote => "note deleted",
            SyncStatus::DeletedFile => "file deleted",
        }
    }
}

/// Classify one note from the current fingerprints of both sides and the
/// manifest entry from the last sync. `None` fingerprints mean the side is
/// absent. Returns `None` when there is nothing to reconcile (neither side
/// exists).
///
/// Without a manifest entry a note present on both sides classifies as
/// `BothChanged`: after manifest loss everything is treated as new on both
/// sides and merged, never deleted.
pub fn classify(
    note_fingerprint: Option<&str>,
    file_fingerprint: Option<&str>,
    entry: Option<&ManifestEntry>,
) -> Option<SyncStatus> {
    match (note_fingerprint, file_fingerprint, entry) {
        (None, None, _) => None,
        (Some(_), None, None) => Some(SyncStatus::NewNote),
        (None, Some(_), None) => Some(SyncStatus::NewFile),
        (Some(_), Some(_), None) => Some(SyncStatus::BothChanged),
        (Some(note_fp), Some(file_fp), Some(entry)) => {
            let note_changed = note_fp != entry.note_fingerprint;
            let file_changed = file_fp != entry.file_fingerprint;
            Some(match (note_changed, file_changed) {
                (false, false) => SyncStatus::Unchanged,
                (true, false) => SyncStatus::NoteChanged,
                (false, true) => SyncStatus::FileChanged,
                (true, true) => SyncStatus::BothChanged,
            })
        }
        // Note gone: deletion only wins if the file did not move on.
        (None, Some(file_fp), Some(entry)) => {
            if file_fp == entry.file_fingerprint {
                Some(SyncStatus::DeletedNote)
            } else {
                Some(SyncStatus::NewFile)
            }
        }
        // File gone: deletion only wins if the note did not move on.
        (Some(note_fp), None, Some(entry)) => {
            if note_fp == entry.note_fingerprint {
                Some(SyncStatus::DeletedFile)
            } else {
                Some(SyncStatus::NewNote)
            }
        }
    }
}
