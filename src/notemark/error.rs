use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum NotemarkError {
    #[error("Note not found: {0}")]
    NoteNotFound(Uuid),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Note store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Malformed unit stream: {0}")]
    Decode(String),

    #[error("Checklist item {requested} out of range (note has {count})")]
    ChecklistOutOfRange { requested: usize, count: usize },

    #[error("Table {0} not found")]
    TableNotFound(usize),

    #[error("Another sync pass holds the lock at {0}")]
    SyncLocked(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, NotemarkError>;
