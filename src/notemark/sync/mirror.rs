//! Mirror files: one Markdown file per note under the sync root.
//!
//! A mirror file is a YAML frontmatter header (note id, folder, tags) and
//! the note's editable text. The header identifies the file across renames
//! and title edits; a file without a parsable header is treated as brand
//! new content, body untouched.

use crate::error::{NotemarkError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const MIRROR_EXT: &str = "md";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorHeader {
    pub id: Uuid,
    pub folder: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Serialize a header and body into mirror-file content.
pub fn render(header: &MirrorHeader, body: &str) -> String {
    let yaml = serde_yaml::to_string(header).unwrap_or_default();
    format!("---\n{}---\n\n{}", yaml, body)
}

/// Split mirror-file content into header and body. Content without a
/// well-formed header comes back whole, as body.
pub fn parse(content: &str) -> (Option<MirrorHeader>, String) {
    if !content.starts_with("---") {
        return (None, content.to_string());
    }
    let rest = &content[3..];
    let Some(pos) = rest.find("\n---") else {
        return (None, content.to_string());
    };
    let yaml = &rest[..pos];
    match serde_yaml::from_str::<MirrorHeader>(yaml) {
        Ok(header) => {
            let after = &rest[pos + 4..];
            let body = after
                .strip_prefix('\n')
                .map(|b| b.strip_prefix('\n').unwrap_or(b))
                .unwrap_or(after);
            (Some(header), body.to_string())
        }
        Err(_) => (None, content.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct MirrorFile {
    /// Path relative to the sync root.
    pub rel_path: PathBuf,
    pub header: Option<MirrorHeader>,
    pub body: String,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Read and parse one mirror file.
pub fn read(root: &Path, rel_path: &Path) -> Result<MirrorFile> {
    let path = root.join(rel_path);
    let content = fs::read_to_string(&path).map_err(NotemarkError::Io)?;
    let (header, body) = parse(&content);
    Ok(MirrorFile {
        rel_path: rel_path.to_path_buf(),
        header,
        body,
        modified_at: mtime(&path),
    })
}

/// Write a mirror file, creating parent directories as needed.
pub fn write(root: &Path, rel_path: &Path, header: &MirrorHeader, body: &str) -> Result<()> {
    let path = root.join(rel_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(NotemarkError::Io)?;
    }
    fs::write(&path, render(header, body)).map_err(NotemarkError::Io)?;
    Ok(())
}

pub fn remove(root: &Path, rel_path: &Path) -> Result<()> {
    let path = root.join(rel_path);
    if path.exists() {
        fs::remove_file(path).map_err(NotemarkError::Io)?;
    }
    Ok(())
}

pub fn mtime(path: &Path) -> Option<DateTime<Utc>> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

/// All mirror files under the root, relative paths in sorted order.
/// Dot-files and dot-directories (the manifest, the lock) are skipped.
pub fn scan(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    if root.exists() {
        walk(root, root, &mut found)?;
    }
    found.sort();
    Ok(found)
}

fn walk(root: &Path, dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir).map_err(NotemarkError::Io)? {
        let entry = entry.map_err(NotemarkError::Io)?;
        let path = entry.path();
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        if path.is_dir() {
            walk(root, &path, found)?;
        } else if path.extension().map(|e| e == MIRROR_EXT).unwrap_or(false) {
            if let Ok(rel) = path.strip_prefix(root) {
                found.push(rel.to_path_buf());
            }
        }
    }
    Ok(())
}

/// Folder implied by a mirror file's location: its relative directory, or
/// the default folder for files at the root.
pub fn implied_folder(rel_path: &Path, default_folder: &str) -> String {
    match rel_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            parent.to_string_lossy().replace(std::path::MAIN_SEPARATOR, "/")
        }
        _ => default_folder.to_string(),
    }
}

pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim()
        .to_string();
    if cleaned.is_empty() {
        "Untitled".to_string()
    } else {
        cleaned
    }
}

/// Relative path for a note's mirror file. Collisions with already-taken
/// paths disambiguate by appending the first 8 hex chars of the note id.
pub fn path_for(
    title: &str,
    id: &Uuid,
    folder: &str,
    default_folder: &str,
    taken: &BTreeSet<PathBuf>,
) -> PathBuf {
    let dir = if folder == default_folder {
        PathBuf::new()
    } else {
        PathBuf::from(sanitize_filename(folder))
    };
    let base = sanitize_filename(title);
    let plain = dir.join(format!("{}.{}", base, MIRROR_EXT));
    if !taken.contains(&plain) {
        return plain;
    }
    let id_hex = id.simple().to_string();
    dir.join(format!("{}-{}.{}", base, &id_hex[..8], MIRROR_EXT))
}
