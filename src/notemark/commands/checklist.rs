use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::NoteStore;
use crate::structure;
use uuid::Uuid;

/// The checklist items of a note, in order.
pub fn items<S: NoteStore>(store: &S, id: Uuid) -> Result<CmdResult> {
    let note = store.get_note(&id)?;
    let text = note.body.to_editable().text;
    let mut result = CmdResult::default();
    result.checklist = structure::parse_checklist(&text);
    if result.checklist.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "\"{}\" has no checklist items",
            note.title()
        )));
    }
    Ok(result)
}

/// Toggle the `item`-th checklist line (1-based). The edit goes through the
/// merge-aware edit path so only the completion marker changes.
pub fn set<S: NoteStore>(store: &mut S, id: Uuid, item: usize, done: bool) -> Result<CmdResult> {
    let note = store.get_note(&id)?;
    let old = note.body.to_editable().text;
    let new = structure::set_checklist_item(&old, item, done)?;

    let mut result = super::update::run(store, id, &old, &new)?;
    result.add_message(CmdMessage::info(format!(
        "Item {} marked {}",
        item,
        if done { "done" } else { "not done" }
    )));
    Ok(result)
}
