use crate::mergeable::{MergeableText, ObjectKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_FOLDER: &str = "Notes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An attachment as seen from the outside: stable id, display name, and the
/// ordinal position within the note. The position is recovered from the
/// body's unit order every time; it is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub id: String,
    pub name: String,
    pub position: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub folder: String,
    pub body: MergeableText,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Note {
    pub fn new(folder: impl Into<String>, body: MergeableText) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            folder: folder.into(),
            body,
            is_pinned: false,
            created_at: now,
            modified_at: now,
        }
    }

    /// Title derived from the first line of the editable projection.
    pub fn title(&self) -> String {
        let editable = self.body.to_editable();
        let first = editable.text.lines().next().unwrap_or("").trim();
        if first.is_empty() {
            "Untitled".to_string()
        } else {
            first.to_string()
        }
    }

    /// Ordered attachment references, derived from unit order. `position`
    /// is the ordinal among all embedded objects so it can be passed back
    /// to detach.
    pub fn attachments(&self) -> Vec<AttachmentRef> {
        self.body
            .objects()
            .into_iter()
            .enumerate()
            .filter(|(_, obj)| obj.kind == ObjectKind::Attachment)
            .map(|(position, obj)| AttachmentRef {
                id: obj.id,
                name: obj.name,
                position,
            })
            .collect()
    }

    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mergeable::{ObjectRef, Unit};

    #[test]
    fn test_title_from_first_line() {
        let note = Note::new(
            DEFAULT_FOLDER,
            MergeableText::from_plain_text("Shopping list\nmilk\n"),
        );
        assert_eq!(note.title(), "Shopping list");
    }

    #[test]
    fn test_title_of_empty_note() {
        let note = Note::new(DEFAULT_FOLDER, MergeableText::default());
        assert_eq!(note.title(), "Untitled");
    }

    #[test]
    fn test_attachments_follow_unit_order() {
        let body = MergeableText::new(vec![
            Unit::Run("Title\n".into()),
            Unit::Object(ObjectRef::attachment("b", "second.png")),
            Unit::Run("\n".into()),
            Unit::Object(ObjectRef::attachment("a", "first.png")),
        ]);
        let note = Note::new(DEFAULT_FOLDER, body);
        let atts = note.attachments();
        assert_eq!(atts.len(), 2);
        assert_eq!(atts[0].id, "b");
        assert_eq!(atts[0].position, 0);
        assert_eq!(atts[1].id, "a");
        assert_eq!(atts[1].position, 1);
    }
}
