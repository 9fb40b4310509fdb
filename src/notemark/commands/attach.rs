use crate::commands::{CmdMessage, CmdResult};
use crate::error::{NotemarkError, Result};
use crate::mergeable::ObjectRef;
use crate::store::NoteStore;
use uuid::Uuid;

/// Ordered attachments of a note.
pub fn list<S: NoteStore>(store: &S, id: Uuid) -> Result<CmdResult> {
    let note = store.get_note(&id)?;
    let mut result = CmdResult::default();
    result.attachments = note.attachments();
    if result.attachments.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "\"{}\" has no attachments",
            note.title()
        )));
    }
    Ok(result)
}

/// Attach a named object, optionally at a position among the existing
/// attachments (1-based; default appends at the end of the note).
pub fn attach<S: NoteStore>(
    store: &mut S,
    id: Uuid,
    name: &str,
    at: Option<usize>,
) -> Result<CmdResult> {
    let mut note = store.get_note(&id)?;
    let attachments = note.attachments();
    let at_ordinal = match at {
        Some(n) if n == 0 || n > attachments.len() + 1 => {
            return Err(NotemarkError::Api(format!(
                "Position {} out of range (note has {} attachments)",
                n,
                attachments.len()
            )));
        }
        // Map the attachment position to the object ordinal; appending past
        // the last attachment means appending to the note.
        Some(n) => attachments.get(n - 1).map(|a| a.position),
        None => None,
    };

    let obj = ObjectRef::attachment(Uuid::new_v4().to_string(), name);
    note.body.attach_object(obj, at_ordinal);
    note.touch();
    store.update_note(&note)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Attached {} to \"{}\"",
        name,
        note.title()
    )));
    result.attachments = note.attachments();
    result.affected_notes = vec![note];
    Ok(result)
}

/// Detach the `number`-th attachment (1-based).
pub fn detach<S: NoteStore>(store: &mut S, id: Uuid, number: usize) -> Result<CmdResult> {
    let mut note = store.get_note(&id)?;
    let attachments = note.attachments();
    let target = attachments.get(number.wrapping_sub(1)).ok_or_else(|| {
        NotemarkError::Api(format!(
            "Attachment {} out of range (note has {})",
            number,
            attachments.len()
        ))
    })?;

    let position = target.position;
    let removed = note.body.detach_object(position).ok_or_else(|| {
        NotemarkError::Api(format!("Attachment {} out of range", number))
    })?;
    note.touch();
    store.update_note(&note)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Detached {} from \"{}\"",
        removed.name,
        note.title()
    )));
    result.attachments = note.attachments();
    result.affected_notes = vec![note];
    Ok(result)
}
