use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::NoteStore;
use crate::structure;
use uuid::Uuid;

/// The `number`-th Markdown table in a note (1-based by occurrence).
pub fn run<S: NoteStore>(store: &S, id: Uuid, number: usize) -> Result<CmdResult> {
    let note = store.get_note(&id)?;
    let text = note.body.to_editable().text;
    let table = structure::parse_table(&text, number)?;
    let mut result = CmdResult::default();
    result.table = Some(table);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotemarkError;
    use crate::store::memory::fixtures::StoreFixture;

    const NOTE: &str = "Budget\n| item | cost |\n| --- | --- |\n| rent | 900 |\n";

    #[test]
    fn test_table_by_number() {
        let fixture = StoreFixture::new().with_note(NOTE);
        let id = fixture.store.list_notes(None).unwrap()[0].id;
        let result = run(&fixture.store, id, 1).unwrap();
        let table = result.table.unwrap();
        assert_eq!(table.header, vec!["item", "cost"]);
        assert_eq!(table.rows, vec![vec!["rent".to_string(), "900".to_string()]]);
    }

    #[test]
    fn test_table_not_found() {
        let fixture = StoreFixture::new().with_note(NOTE);
        let id = fixture.store.list_notes(None).unwrap()[0].id;
        assert!(matches!(
            run(&fixture.store, id, 2),
            Err(NotemarkError::TableNotFound(2))
        ));
    }
}
