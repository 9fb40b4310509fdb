use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::NoteStore;
use uuid::Uuid;

pub fn run<S: NoteStore>(store: &mut S, id: Uuid) -> Result<CmdResult> {
    let note = store.get_note(&id)?;
    let title = note.title();
    store.delete_note(&id)?;

    let mut result = CmdResult::default().with_affected_notes(vec![note]);
    result.add_message(CmdMessage::success(format!("Deleted \"{}\"", title)));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn test_delete_removes_note() {
        let mut fixture = StoreFixture::new().with_note("Gone\n");
        let id = fixture.store.list_notes(None).unwrap()[0].id;
        run(&mut fixture.store, id).unwrap();
        assert!(fixture.store.list_notes(None).unwrap().is_empty());
    }

    #[test]
    fn test_delete_unknown_id() {
        let mut fixture = StoreFixture::new();
        assert!(run(&mut fixture.store, Uuid::new_v4()).is_err());
    }
}
