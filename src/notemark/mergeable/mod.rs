//! # Mergeable Text
//!
//! Each note body is a sequence of content units: plain character runs and
//! embedded object references (attachments, opaque tables). The visible
//! text is the flattening of the units in order; every non-character unit
//! projects to a placeholder token in the editable form and resolves back
//! to the same unit identity on the way in.
//!
//! The container is mutated only through [`MergeableText::apply_edit`] and
//! [`MergeableText::merge_snapshot`] (or the attach/detach helpers, which
//! are themselves expressed as codec round-trips); unit sequences are
//! never spliced positionally.

use serde::{Deserialize, Serialize};

pub mod codec;
pub mod diff;
pub mod merge;
pub mod unit;

pub use merge::{Merged, Segment};
pub use unit::{ObjectKind, ObjectRef, Unit};

/// Plain-text projection of a [`MergeableText`]: the editable text plus the
/// ordered decode table that maps placeholder ordinals back to units.
/// Ephemeral; produced on demand and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editable {
    pub text: String,
    pub refs: Vec<ObjectRef>,
}

/// A local hunk that lost an overlapping merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictHunk {
    pub ours: String,
    pub theirs: String,
}

/// Outcome of applying a user edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// No concurrent change; the edit applied directly.
    Applied,
    /// A concurrent change was merged in; conflicts list the local hunks
    /// that lost to the committed state (empty when the merge was clean).
    Merged { conflicts: Vec<ConflictHunk> },
}

impl EditOutcome {
    pub fn conflicts(&self) -> &[ConflictHunk] {
        match self {
            EditOutcome::Applied => &[],
            EditOutcome::Merged { conflicts } => conflicts,
        }
    }
}

/// Versioned text container for one note body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct MergeableText {
    units: Vec<Unit>,
}

impl MergeableText {
    pub fn new(units: Vec<Unit>) -> Self {
        Self {
            units: unit::normalize(units),
        }
    }

    pub fn from_plain_text(text: &str) -> Self {
        Self::new(vec![Unit::Run(text.to_string())])
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Project to editable text with placeholder tokens.
    pub fn to_editable(&self) -> Editable {
        let (text, refs) = codec::decode(&self.units);
        Editable { text, refs }
    }

    /// Ordered object references, derived from unit order. The unit order
    /// is authoritative; this is never cached.
    pub fn objects(&self) -> Vec<ObjectRef> {
        self.units
            .iter()
            .filter_map(Unit::as_object)
            .cloned()
            .collect()
    }

    /// Apply a user edit made against `old` (the editable text at the start
    /// of the edit session), producing `new`. If nothing changed underneath
    /// the session the edit applies directly, preserving the identity of
    /// every unit the user did not touch. Otherwise the user's edits and
    /// the concurrent edits are three-way merged; overlapping regions
    /// resolve to the committed state and the losing local hunks are
    /// reported.
    pub fn apply_edit(&mut self, old: &str, new: &str) -> EditOutcome {
        let current = self.to_editable();
        if current.text == old {
            self.units = codec::encode(new, &current.refs);
            return EditOutcome::Applied;
        }

        let merged = merge::merge3(old, &current.text, new);
        let conflicts = merged
            .conflicts()
            .into_iter()
            .map(|(ours, theirs)| ConflictHunk {
                ours: ours.to_string(),
                theirs: theirs.to_string(),
            })
            .collect();
        self.units = codec::encode(&merged.resolved_text(), &current.refs);
        EditOutcome::Merged { conflicts }
    }

    /// Three-way merge against a remote plain-text snapshot, with the
    /// last-synced snapshot as the common ancestor. The committed (note)
    /// side wins overlapping regions; the full [`Merged`] is returned so
    /// the caller can render the annotated form for the other side.
    pub fn merge_snapshot(&mut self, ancestor: &str, remote: &str) -> Merged {
        let current = self.to_editable();
        let merged = merge::merge3(ancestor, &current.text, remote);
        self.units = codec::encode(&merged.resolved_text(), &current.refs);
        merged
    }

    /// Insert an object. `at` addresses the insertion point as an ordinal
    /// among the existing objects; `None` appends at the end of the text.
    /// Expressed as a decode/edit/encode round-trip so every surviving unit
    /// keeps its identity.
    pub fn attach_object(&mut self, obj: ObjectRef, at: Option<usize>) {
        let current = self.to_editable();
        let token = codec::placeholder(&obj, current.refs.len());
        let spans = codec::token_spans(&current.text);

        let mut text = current.text.clone();
        match at.filter(|n| *n < spans.len()) {
            Some(n) => {
                text.insert_str(spans[n].0, &format!("{}\n", token));
            }
            None => {
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(&token);
            }
        }

        let mut refs = current.refs;
        refs.push(obj);
        self.units = codec::encode(&text, &refs);
    }

    /// Remove the n-th object (0-based, in unit order). Returns the removed
    /// reference, or `None` when out of range.
    pub fn detach_object(&mut self, ordinal: usize) -> Option<ObjectRef> {
        let current = self.to_editable();
        let spans = codec::token_spans(&current.text);
        let &(start, end) = spans.get(ordinal)?;
        let removed = current.refs.get(ordinal)?.clone();

        let mut text = current.text.clone();
        // Swallow one trailing newline so the token's line disappears with it.
        let end = if text[end..].starts_with('\n') { end + 1 } else { end };
        text.replace_range(start..end, "");
        self.units = codec::encode(&text, &current.refs);
        Some(removed)
    }
}
