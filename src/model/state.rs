//! Session state held by the StateBus

use std::fmt;
use std::path::{Path, PathBuf};

use crate::PRODUCT_TITLE;

/// Which top-level view the presentation layer shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActiveView {
    /// Nothing open
    #[default]
    Blank,
    /// The CSV grid
    Table,
}

impl ActiveView {
    pub fn name(self) -> &'static str {
        match self {
            ActiveView::Blank => "Blank",
            ActiveView::Table => "Table",
        }
    }
}

impl fmt::Display for ActiveView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cross-cutting state of the running editor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// File backing the open document (None = nothing open)
    pub active_file: Option<PathBuf>,
    /// Whether the document has changes not yet written to `active_file`
    pub dirty: bool,
    pub active_view: ActiveView,
    /// Short status line text, empty by default
    pub status_text: String,
}

impl SessionState {
    pub fn active_file(&self) -> Option<&Path> {
        self.active_file.as_deref()
    }

    /// File name of the active file, for display
    pub fn file_name(&self) -> Option<String> {
        self.active_file
            .as_deref()
            .map(crate::util::filename_for_display)
    }

    /// Window title, e.g. `people.csv* - csvpad`
    pub fn window_title(&self) -> String {
        match self.file_name() {
            Some(name) if !name.is_empty() => format!(
                "{}{} - {}",
                name,
                if self.dirty { "*" } else { "" },
                PRODUCT_TITLE
            ),
            _ => PRODUCT_TITLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = SessionState::default();
        assert_eq!(state.active_file(), None);
        assert!(!state.dirty);
        assert_eq!(state.active_view, ActiveView::Blank);
        assert_eq!(state.status_text, "");
    }

    #[test]
    fn test_window_title() {
        let mut state = SessionState::default();
        assert_eq!(state.window_title(), PRODUCT_TITLE);

        state.active_file = Some(PathBuf::from("/data/people.csv"));
        assert_eq!(state.window_title(), format!("people.csv - {}", PRODUCT_TITLE));

        state.dirty = true;
        assert_eq!(state.window_title(), format!("people.csv* - {}", PRODUCT_TITLE));
    }
}
