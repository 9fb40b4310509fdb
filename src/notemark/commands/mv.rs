use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::NoteStore;
use uuid::Uuid;

/// Move a note to another folder. The folder name resolves
/// case-insensitively against existing folders and is created verbatim
/// otherwise.
pub fn run<S: NoteStore>(store: &mut S, id: Uuid, folder: &str) -> Result<CmdResult> {
    let mut note = store.get_note(&id)?;
    let target = store
        .resolve_folder(folder)
        .map(|f| f.name)
        .unwrap_or_else(|_| folder.to_string());

    note.folder = target.clone();
    note.touch();
    store.update_note(&note)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Moved \"{}\" to {}",
        note.title(),
        target
    )));
    result.affected_notes = vec![note];
    Ok(result)
}
