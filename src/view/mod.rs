//! Typed view models rendered to markup with `maud`.
//!
//! Every renderer returns the complete new content of its container; there
//! is no incremental update. Interpolated text is escaped by `maud`.

pub mod admin;
pub mod student;

use std::fmt;

/// What a row button asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Edit,
    Delete,
    View,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Edit => "edit",
            ActionKind::Delete => "delete",
            ActionKind::View => "view",
        }
    }
}

/// A click on a rendered row control, resolved from its `data-action` and
/// `data-id` attributes by the container's delegated listener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowAction {
    pub kind: ActionKind,
    pub id: String,
}

impl RowAction {
    pub fn parse(action: &str, id: &str) -> Option<Self> {
        if id.is_empty() {
            return None;
        }
        let kind = match action {
            "edit" => ActionKind::Edit,
            "delete" => ActionKind::Delete,
            "view" => ActionKind::View,
            _ => return None,
        };
        Some(Self {
            kind,
            id: id.to_string(),
        })
    }
}

impl fmt::Display for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.as_str(), self.id)
    }
}

/// Share of completed students as a whole percentage, rounded half up.
pub fn completion_rate(total_students: u32, completed: u32) -> u32 {
    if total_students == 0 {
        return 0;
    }
    ((completed as f64 / total_students as f64) * 100.0).round() as u32
}
