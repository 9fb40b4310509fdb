use crate::commands::{CmdMessage, CmdResult};
use crate::error::{NotemarkError, Result};
use crate::mergeable::MergeableText;
use crate::model::DEFAULT_FOLDER;
use crate::store::NoteStore;

pub fn run<S: NoteStore>(store: &mut S, folder: Option<&str>, text: &str) -> Result<CmdResult> {
    if text.trim().is_empty() {
        return Err(NotemarkError::Api("Note text cannot be empty".into()));
    }
    let folder = folder.unwrap_or(DEFAULT_FOLDER);
    let note = store.create_note(folder, MergeableText::from_plain_text(text))?;

    let mut result = CmdResult::default().with_affected_notes(vec![note.clone()]);
    result.add_message(CmdMessage::success(format!(
        "Created \"{}\" in {}",
        note.title(),
        folder
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn test_create_derives_title_from_first_line() {
        let mut store = InMemoryStore::new();
        let result = run(&mut store, None, "Trip plan\n\npack bags\n").unwrap();
        assert_eq!(result.affected_notes[0].title(), "Trip plan");
        assert_eq!(result.affected_notes[0].folder, DEFAULT_FOLDER);
    }

    #[test]
    fn test_create_in_named_folder() {
        let mut store = InMemoryStore::new();
        let result = run(&mut store, Some("Work"), "Standup\n").unwrap();
        assert_eq!(result.affected_notes[0].folder, "Work");
        assert_eq!(store.list_notes(Some("Work")).unwrap().len(), 1);
    }

    #[test]
    fn test_create_rejects_empty_text() {
        let mut store = InMemoryStore::new();
        assert!(run(&mut store, None, "  \n").is_err());
    }
}
