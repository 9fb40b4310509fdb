use super::helpers::indexed_notes;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::NoteStore;

pub fn run<S: NoteStore>(store: &S, folder: Option<&str>) -> Result<CmdResult> {
    let folder = match folder {
        Some(name) => Some(store.resolve_folder(name)?.name),
        None => None,
    };
    let listed = indexed_notes(store, folder.as_deref())?;

    let mut result = CmdResult::default().with_listed_notes(listed);
    if result.listed_notes.is_empty() {
        result.add_message(CmdMessage::info("No notes found."));
    }
    Ok(result)
}

pub fn folders<S: NoteStore>(store: &S) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    for folder in store.list_folders()? {
        let count = store.list_notes(Some(&folder.name))?.len();
        result.folders.push((folder.name, count));
    }
    if result.folders.is_empty() {
        result.add_message(CmdMessage::info("No folders found."));
    }
    Ok(result)
}
