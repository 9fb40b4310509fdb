use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::NoteStore;
use uuid::Uuid;

pub fn pin<S: NoteStore>(store: &mut S, id: Uuid) -> Result<CmdResult> {
    set_pinned(store, id, true)
}

pub fn unpin<S: NoteStore>(store: &mut S, id: Uuid) -> Result<CmdResult> {
    set_pinned(store, id, false)
}

fn set_pinned<S: NoteStore>(store: &mut S, id: Uuid, pinned: bool) -> Result<CmdResult> {
    let mut note = store.get_note(&id)?;
    let mut result = CmdResult::default();
    if note.is_pinned == pinned {
        result.add_message(CmdMessage::info(format!(
            "\"{}\" is already {}",
            note.title(),
            if pinned { "pinned" } else { "unpinned" }
        )));
        return Ok(result);
    }
    note.is_pinned = pinned;
    store.update_note(&note)?;

    result.add_message(CmdMessage::success(format!(
        "{} \"{}\"",
        if pinned { "Pinned" } else { "Unpinned" },
        note.title()
    )));
    result.affected_notes = vec![note];
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn test_pin_then_unpin() {
        let mut fixture = StoreFixture::new().with_note("Important\n");
        let id = fixture.store.list_notes(None).unwrap()[0].id;

        pin(&mut fixture.store, id).unwrap();
        assert!(fixture.store.get_note(&id).unwrap().is_pinned);

        unpin(&mut fixture.store, id).unwrap();
        assert!(!fixture.store.get_note(&id).unwrap().is_pinned);
    }

    #[test]
    fn test_pin_is_idempotent() {
        let mut fixture = StoreFixture::new().with_pinned_note("Pinned\n");
        let id = fixture.store.list_notes(None).unwrap()[0].id;
        let result = pin(&mut fixture.store, id).unwrap();
        assert!(result.affected_notes.is_empty());
    }
}
