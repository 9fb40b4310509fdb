use crate::error::{NotemarkError, Result};
use crate::index::{index_notes, DisplayIndex, DisplayNote};
use crate::store::NoteStore;
use uuid::Uuid;

pub fn indexed_notes<S: NoteStore>(store: &S, folder: Option<&str>) -> Result<Vec<DisplayNote>> {
    let notes = store.list_notes(folder)?;
    Ok(index_notes(notes))
}

pub fn resolve_index<S: NoteStore>(store: &S, index: DisplayIndex) -> Result<Uuid> {
    let indexed = indexed_notes(store, None)?;
    indexed
        .iter()
        .find(|dn| dn.index == index)
        .map(|dn| dn.note.id)
        .ok_or_else(|| NotemarkError::Api(format!("Index {} not found", index)))
}

pub fn note_by_index<S: NoteStore>(store: &S, index: DisplayIndex) -> Result<DisplayNote> {
    let indexed = indexed_notes(store, None)?;
    indexed
        .into_iter()
        .find(|dn| dn.index == index)
        .ok_or_else(|| NotemarkError::Api(format!("Index {} not found", index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn test_resolve_index_finds_note() {
        let fixture = StoreFixture::new().with_note("Only\n");
        let id = resolve_index(&fixture.store, DisplayIndex::Regular(1)).unwrap();
        let dn = note_by_index(&fixture.store, DisplayIndex::Regular(1)).unwrap();
        assert_eq!(dn.note.id, id);
    }

    #[test]
    fn test_resolve_missing_index() {
        let fixture = StoreFixture::new();
        assert!(resolve_index(&fixture.store, DisplayIndex::Regular(1)).is_err());
    }
}
