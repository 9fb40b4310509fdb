//! Display indexing.
//!
//! Listing commands address notes by a 1-based position (`1`, `2`, ...)
//! with pinned notes pulled to the front under a `p` prefix (`p1`, `p2`).
//! Indexes are a view-layer convenience: they are re-derived from a
//! deterministic sort over a fresh snapshot on every invocation and never
//! cached, so a stale index can never address the wrong note.

use crate::error::{NotemarkError, Result};
use crate::model::Note;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayIndex {
    Pinned(usize),
    Regular(usize),
}

impl std::fmt::Display for DisplayIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayIndex::Pinned(i) => write!(f, "p{}", i),
            DisplayIndex::Regular(i) => write!(f, "{}", i),
        }
    }
}

impl FromStr for DisplayIndex {
    type Err = NotemarkError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(rest) = s.strip_prefix('p') {
            if let Ok(n) = rest.parse() {
                return Ok(DisplayIndex::Pinned(n));
            }
        }
        if let Ok(n) = s.parse() {
            return Ok(DisplayIndex::Regular(n));
        }
        Err(NotemarkError::Api(format!("Invalid index format: {}", s)))
    }
}

#[derive(Debug, Clone)]
pub struct DisplayNote {
    pub note: Note,
    pub index: DisplayIndex,
}

/// Assign display indexes: pinned notes first (`p1..`), then the rest
/// (`1..`), each group ordered by modification time descending with the id
/// as a tie-break so the order is total.
pub fn index_notes(mut notes: Vec<Note>) -> Vec<DisplayNote> {
    notes.sort_by(|a, b| {
        b.modified_at
            .cmp(&a.modified_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut results = Vec::with_capacity(notes.len());
    let mut pinned_idx = 1;
    for note in notes.iter().filter(|n| n.is_pinned) {
        results.push(DisplayNote {
            note: note.clone(),
            index: DisplayIndex::Pinned(pinned_idx),
        });
        pinned_idx += 1;
    }
    let mut regular_idx = 1;
    for note in notes.into_iter().filter(|n| !n.is_pinned) {
        results.push(DisplayNote {
            note,
            index: DisplayIndex::Regular(regular_idx),
        });
        regular_idx += 1;
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mergeable::MergeableText;
    use crate::model::DEFAULT_FOLDER;
    use chrono::Duration;

    fn note(title: &str, minutes_ago: i64, pinned: bool) -> Note {
        let mut n = Note::new(
            DEFAULT_FOLDER,
            MergeableText::from_plain_text(&format!("{}\n", title)),
        );
        n.modified_at = chrono::Utc::now() - Duration::minutes(minutes_ago);
        n.is_pinned = pinned;
        n
    }

    #[test]
    fn test_pinned_first_then_recency() {
        let notes = vec![
            note("old", 60, false),
            note("pinned", 120, true),
            note("new", 1, false),
        ];
        let indexed = index_notes(notes);
        assert_eq!(indexed[0].note.title(), "pinned");
        assert_eq!(indexed[0].index, DisplayIndex::Pinned(1));
        assert_eq!(indexed[1].note.title(), "new");
        assert_eq!(indexed[1].index, DisplayIndex::Regular(1));
        assert_eq!(indexed[2].note.title(), "old");
        assert_eq!(indexed[2].index, DisplayIndex::Regular(2));
    }

    #[test]
    fn test_parse_index_strings() {
        assert_eq!("3".parse::<DisplayIndex>().unwrap(), DisplayIndex::Regular(3));
        assert_eq!("p2".parse::<DisplayIndex>().unwrap(), DisplayIndex::Pinned(2));
        assert!("x9".parse::<DisplayIndex>().is_err());
    }

    #[test]
    fn test_index_round_trips_through_display() {
        for idx in [DisplayIndex::Pinned(4), DisplayIndex::Regular(11)] {
            assert_eq!(idx.to_string().parse::<DisplayIndex>().unwrap(), idx);
        }
    }
}
