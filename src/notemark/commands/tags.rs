use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::NoteStore;
use crate::structure;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Tags of one note, in order of first appearance.
pub fn of_note<S: NoteStore>(store: &S, id: Uuid) -> Result<CmdResult> {
    let note = store.get_note(&id)?;
    let text = note.body.to_editable().text;
    let mut result = CmdResult::default();
    result.tags = structure::extract_tags(&text)
        .into_iter()
        .map(|t| (t, 1))
        .collect();
    if result.tags.is_empty() {
        result.add_message(CmdMessage::info(format!("\"{}\" has no tags", note.title())));
    }
    Ok(result)
}

/// Tag census across the whole store: every tag with the number of notes
/// carrying it, sorted by name.
pub fn census<S: NoteStore>(store: &S) -> Result<CmdResult> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for note in store.list_notes(None)? {
        let text = note.body.to_editable().text;
        for tag in structure::extract_tags(&text) {
            *counts.entry(tag).or_default() += 1;
        }
    }
    let mut result = CmdResult::default();
    result.tags = counts.into_iter().collect();
    if result.tags.is_empty() {
        result.add_message(CmdMessage::info("No tags found."));
    }
    Ok(result)
}
