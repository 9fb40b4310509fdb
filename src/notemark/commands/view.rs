use super::helpers::note_by_index;
use crate::commands::CmdResult;
use crate::error::Result;
use crate::index::DisplayIndex;
use crate::store::NoteStore;

pub fn run<S: NoteStore>(store: &S, index: DisplayIndex) -> Result<CmdResult> {
    let dn = note_by_index(store, index)?;
    let text = dn.note.body.to_editable().text;
    Ok(CmdResult::default()
        .with_affected_notes(vec![dn.note])
        .with_body_text(text))
}
