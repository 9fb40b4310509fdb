use super::helpers::indexed_notes;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::NoteStore;

/// Case-insensitive substring search over titles and bodies. Indexes in
/// the result are the same as a plain listing would show, so a search hit
/// can be addressed directly.
pub fn run<S: NoteStore>(store: &S, query: &str) -> Result<CmdResult> {
    let needle = query.to_lowercase();
    let listed = indexed_notes(store, None)?
        .into_iter()
        .filter(|dn| {
            dn.note.title().to_lowercase().contains(&needle)
                || dn
                    .note
                    .body
                    .to_editable()
                    .text
                    .to_lowercase()
                    .contains(&needle)
        })
        .collect::<Vec<_>>();

    let mut result = CmdResult::default().with_listed_notes(listed);
    if result.listed_notes.is_empty() {
        result.add_message(CmdMessage::info(format!("No notes matching {:?}", query)));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DisplayIndex;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn test_search_matches_body_case_insensitive() {
        let fixture = StoreFixture::new()
            .with_note("Groceries\nBuy MILK\n")
            .with_note("Other\nnothing here\n");
        let result = run(&fixture.store, "milk").unwrap();
        assert_eq!(result.listed_notes.len(), 1);
        assert_eq!(result.listed_notes[0].note.title(), "Groceries");
    }

    #[test]
    fn test_search_keeps_listing_indexes() {
        let fixture = StoreFixture::new().with_note("First\n").with_note("Second\n");
        let all = indexed_notes(&fixture.store, None).unwrap();
        let target = all
            .iter()
            .find(|dn| dn.note.title() == "First")
            .unwrap()
            .index;

        let result = run(&fixture.store, "first").unwrap();
        assert_eq!(result.listed_notes[0].index, target);
        assert_ne!(result.listed_notes[0].index, DisplayIndex::Regular(0));
    }
}
