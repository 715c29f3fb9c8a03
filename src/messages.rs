//! Change notifications emitted by the StateBus
//!
//! One variant per session-state field, each carrying the old and new value.

use std::fmt;
use std::path::PathBuf;

use crate::model::ActiveView;

/// Field of [`crate::model::SessionState`] a change refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateField {
    ActiveFile,
    Dirty,
    ActiveView,
    StatusText,
}

impl StateField {
    pub fn name(self) -> &'static str {
        match self {
            StateField::ActiveFile => "active_file",
            StateField::Dirty => "dirty",
            StateField::ActiveView => "active_view",
            StateField::StatusText => "status_text",
        }
    }
}

/// A single state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// The open file changed (None = nothing open)
    ActiveFile {
        old: Option<PathBuf>,
        new: Option<PathBuf>,
    },
    /// Unsaved-changes flag flipped
    Dirty { old: bool, new: bool },
    /// View switch; observers tear down `old` before wiring `new`
    ActiveView { old: ActiveView, new: ActiveView },
    /// Status line text changed
    StatusText { old: String, new: String },
}

impl StateChange {
    pub fn field(&self) -> StateField {
        match self {
            StateChange::ActiveFile { .. } => StateField::ActiveFile,
            StateChange::Dirty { .. } => StateField::Dirty,
            StateChange::ActiveView { .. } => StateField::ActiveView,
            StateChange::StatusText { .. } => StateField::StatusText,
        }
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "<none>".to_string(),
    }
}

impl fmt::Display for StateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateChange::ActiveFile { old, new } => write!(
                f,
                "active_file: {} -> {}",
                display_path(old),
                display_path(new)
            ),
            StateChange::Dirty { old, new } => write!(f, "dirty: {} -> {}", old, new),
            StateChange::ActiveView { old, new } => write!(f, "active_view: {} -> {}", old, new),
            StateChange::StatusText { old, new } => {
                write!(f, "status_text: {:?} -> {:?}", old, new)
            }
        }
    }
}
