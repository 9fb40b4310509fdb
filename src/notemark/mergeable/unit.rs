use serde::{Deserialize, Serialize};

/// Kind of an embedded object reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Attachment,
    Table,
}

impl ObjectKind {
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Attachment => "attachment",
            ObjectKind::Table => "table",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "attachment" => Some(ObjectKind::Attachment),
            "table" => Some(ObjectKind::Table),
            _ => None,
        }
    }
}

/// A reference to an embedded object. The id is stable for the lifetime of
/// the object; the display name is not required to be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: String,
    pub kind: ObjectKind,
    pub name: String,
}

impl ObjectRef {
    pub fn attachment(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ObjectKind::Attachment,
            name: name.into(),
        }
    }
}

/// An indivisible element of mergeable text: a run of plain characters or an
/// embedded object reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Run(String),
    Object(ObjectRef),
}

impl Unit {
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Unit::Object(obj) => Some(obj),
            Unit::Run(_) => None,
        }
    }
}

/// Merge adjacent runs and drop empty ones, leaving a canonical sequence.
/// Object units are never touched.
pub fn normalize(units: Vec<Unit>) -> Vec<Unit> {
    let mut out: Vec<Unit> = Vec::with_capacity(units.len());
    for unit in units {
        match unit {
            Unit::Run(text) if text.is_empty() => {}
            Unit::Run(text) => match out.last_mut() {
                Some(Unit::Run(prev)) => prev.push_str(&text),
                _ => out.push(Unit::Run(text)),
            },
            obj @ Unit::Object(_) => out.push(obj),
        }
    }
    out
}
