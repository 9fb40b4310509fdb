use crate::commands::{CmdMessage, CmdResult};
use crate::error::{NotemarkError, Result};
use crate::mergeable::EditOutcome;
use crate::store::NoteStore;
use uuid::Uuid;

/// Apply an edit session's result. `old_text` is the editable text the
/// session started from; if the note changed in the store meanwhile the two
/// edits are three-way merged and any overlapping regions are reported as
/// warnings instead of silently losing the user's words.
pub fn run<S: NoteStore>(
    store: &mut S,
    id: Uuid,
    old_text: &str,
    new_text: &str,
) -> Result<CmdResult> {
    let mut note = store.get_note(&id)?;
    let outcome = note.body.apply_edit(old_text, new_text);
    note.touch();
    store.update_note(&note)?;

    let mut result = CmdResult::default();
    match &outcome {
        EditOutcome::Applied => {
            result.add_message(CmdMessage::success(format!("Updated \"{}\"", note.title())));
        }
        EditOutcome::Merged { conflicts } if conflicts.is_empty() => {
            result.add_message(CmdMessage::success(format!(
                "Updated \"{}\" (merged with a concurrent change)",
                note.title()
            )));
        }
        EditOutcome::Merged { conflicts } => {
            result.add_message(CmdMessage::warning(format!(
                "Updated \"{}\" but {} region(s) overlapped a concurrent change; the stored version won:",
                note.title(),
                conflicts.len()
            )));
            for hunk in conflicts {
                result.add_message(CmdMessage::warning(format!(
                    "  your version: {:?}",
                    hunk.theirs
                )));
            }
        }
    }
    result.affected_notes = vec![note];
    Ok(result)
}

/// Literal find/replace over the editable text, applied through the same
/// merge-aware path as an editor session.
pub fn replace<S: NoteStore>(
    store: &mut S,
    id: Uuid,
    find: &str,
    replacement: &str,
) -> Result<CmdResult> {
    if find.is_empty() {
        return Err(NotemarkError::Api("Search string cannot be empty".into()));
    }
    let note = store.get_note(&id)?;
    let old = note.body.to_editable().text;
    let count = old.matches(find).count();
    if count == 0 {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::info(format!("No occurrences of {:?}", find)));
        return Ok(result);
    }
    let new = old.replace(find, replacement);
    let mut result = run(store, id, &old, &new)?;
    result.add_message(CmdMessage::info(format!(
        "Replaced {} occurrence(s)",
        count
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::NoteStore;

    #[test]
    fn test_update_applies_edit() {
        let mut fixture = StoreFixture::new().with_note("Title\nold body\n");
        let id = fixture.store.list_notes(None).unwrap()[0].id;
        let old = fixture.store.get_note(&id).unwrap().body.to_editable().text;

        run(&mut fixture.store, id, &old, "Title\nnew body\n").unwrap();
        let stored = fixture.store.get_note(&id).unwrap();
        assert_eq!(stored.body.to_editable().text, "Title\nnew body\n");
    }

    #[test]
    fn test_update_merges_concurrent_store_change() {
        let mut fixture = StoreFixture::new().with_note("Title\nalpha\nbeta\n");
        let id = fixture.store.list_notes(None).unwrap()[0].id;
        let session_start = fixture.store.get_note(&id).unwrap().body.to_editable().text;

        // A sync pass lands a change while the editor is open.
        run(
            &mut fixture.store,
            id,
            &session_start,
            "Title\nalpha\nBETA\n",
        )
        .unwrap();

        // The user's edit, made against the session snapshot.
        let result = run(
            &mut fixture.store,
            id,
            &session_start,
            "Title\nALPHA\nbeta\n",
        )
        .unwrap();

        let text = fixture.store.get_note(&id).unwrap().body.to_editable().text;
        assert_eq!(text, "Title\nALPHA\nBETA\n");
        assert!(result
            .messages
            .iter()
            .all(|m| !matches!(m.level, crate::commands::MessageLevel::Error)));
    }

    #[test]
    fn test_replace_counts_occurrences() {
        let mut fixture = StoreFixture::new().with_note("Title\nfoo and foo\n");
        let id = fixture.store.list_notes(None).unwrap()[0].id;

        replace(&mut fixture.store, id, "foo", "bar").unwrap();
        let text = fixture.store.get_note(&id).unwrap().body.to_editable().text;
        assert_eq!(text, "Title\nbar and bar\n");
    }

    #[test]
    fn test_replace_no_match_leaves_note_alone() {
        let mut fixture = StoreFixture::new().with_note("Title\nbody\n");
        let id = fixture.store.list_notes(None).unwrap()[0].id;
        let before = fixture.store.get_note(&id).unwrap().modified_at;

        replace(&mut fixture.store, id, "missing", "x").unwrap();
        assert_eq!(fixture.store.get_note(&id).unwrap().modified_at, before);
    }
}
