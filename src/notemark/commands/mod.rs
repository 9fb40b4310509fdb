use crate::index::DisplayNote;
use crate::model::{AttachmentRef, Note};
use crate::structure::{ChecklistItem, Table};

pub mod attach;
pub mod checklist;
pub mod create;
pub mod delete;
pub mod helpers;
pub mod links;
pub mod list;
pub mod mv;
pub mod pinning;
pub mod search;
pub mod table;
pub mod tags;
pub mod update;
pub mod view;

#[derive(Debug, Clone)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// Structured result of a command. Commands never print; the CLI decides
/// how each field is rendered.
#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_notes: Vec<Note>,
    pub listed_notes: Vec<DisplayNote>,
    pub folders: Vec<(String, usize)>,
    pub attachments: Vec<AttachmentRef>,
    pub tags: Vec<(String, usize)>,
    pub checklist: Vec<ChecklistItem>,
    pub table: Option<Table>,
    pub body_text: Option<String>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_notes(mut self, notes: Vec<Note>) -> Self {
        self.affected_notes = notes;
        self
    }

    pub fn with_listed_notes(mut self, notes: Vec<DisplayNote>) -> Self {
        self.listed_notes = notes;
        self
    }

    pub fn with_body_text(mut self, text: String) -> Self {
        self.body_text = Some(text);
        self
    }
}
