//! The sync manifest: last-known-synced state per note.
//!
//! Loaded at pass start and rewritten atomically (write-temp-then-rename)
//! at pass end. A corrupt manifest is treated as empty: every note then
//! re-classifies as new on both sides and merges, which can never turn into
//! a deletion.

use crate::error::{NotemarkError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

pub const MANIFEST_FILENAME: &str = ".notemark.manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Mirror file path, relative to the sync root.
    pub file_path: PathBuf,
    pub note_fingerprint: String,
    pub file_fingerprint: String,
    /// Editable text as of the last sync; the common ancestor for
    /// three-way merges.
    pub last_synced_text: String,
    pub last_synced_at: DateTime<Utc>,
    /// Mirror file mtime at last sync; lets a pass skip re-hashing an
    /// untouched file. Hashes stay authoritative.
    #[serde(default)]
    pub file_modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: BTreeMap<Uuid, ManifestEntry>,
}

impl Manifest {
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(MANIFEST_FILENAME)
    }

    /// Load the manifest from the sync root. Missing or unreadable
    /// manifests are empty manifests, never errors.
    pub fn load(root: &Path) -> Manifest {
        let path = Self::path_in(root);
        if !path.exists() {
            return Manifest::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(manifest) => manifest,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt sync manifest, starting from empty");
                    Manifest::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable sync manifest, starting from empty");
                Manifest::default()
            }
        }
    }

    /// Persist atomically: write to a temp file in the same directory, then
    /// rename over the target.
    pub fn save(&self, root: &Path) -> Result<()> {
        let path = Self::path_in(root);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(self).map_err(NotemarkError::Serialization)?;
        fs::write(&tmp, content).map_err(NotemarkError::Io)?;
        fs::rename(&tmp, &path).map_err(NotemarkError::Io)?;
        Ok(())
    }
}
