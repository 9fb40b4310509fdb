use super::helpers::indexed_notes;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::NoteStore;
use crate::structure;

/// Notes whose bodies link `[[title]]`. Link targets resolve against note
/// titles by exact match first, then case-insensitively. Backlinks are
/// computed by scanning, never stored.
pub fn backlinks<S: NoteStore>(store: &S, title: &str) -> Result<CmdResult> {
    let listed = indexed_notes(store, None)?;

    // Prefer an exact title match for resolution; fall back to the
    // case-insensitive one.
    let target = listed
        .iter()
        .find(|dn| dn.note.title() == title)
        .or_else(|| {
            listed
                .iter()
                .find(|dn| dn.note.title().eq_ignore_ascii_case(title))
        })
        .map(|dn| dn.note.title());
    let Some(target) = target else {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::warning(format!("No note titled \"{}\"", title)));
        return Ok(result);
    };

    let linking = listed
        .into_iter()
        .filter(|dn| {
            let text = dn.note.body.to_editable().text;
            structure::extract_links(&text)
                .iter()
                .any(|l| l == &target || l.eq_ignore_ascii_case(&target))
        })
        .collect::<Vec<_>>();

    let mut result = CmdResult::default().with_listed_notes(linking);
    if result.listed_notes.is_empty() {
        result.add_message(CmdMessage::info(format!("No notes link to \"{}\"", target)));
    }
    Ok(result)
}
