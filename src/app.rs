//! Application controller
//!
//! The thin layer collaborators call. It owns the [`StateBus`], the open
//! [`Document`] and the [`EditorConfig`], performs document operations and
//! publishes their outcome through the bus.

use std::path::{Path, PathBuf};

use crate::bus::{StateBus, StateObserver, SubscriberId};
use crate::config::EditorConfig;
use crate::error::{Error, Result, StateError};
use crate::model::{Document, EditSession, SessionState};
use crate::util::filename_for_display;

pub const STATUS_TABLE_UPDATED: &str = "Table updated";
pub const STATUS_NO_CHANGES: &str = "No changes made";
pub const STATUS_SAVED: &str = "Data saved to file";

/// Upper bound on reconciliation rounds after one operation
const MAX_RECONCILE_PASSES: usize = 4;

#[derive(Debug, Default)]
pub struct App {
    bus: StateBus,
    document: Document,
    config: EditorConfig,
}

impl App {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            bus: StateBus::new(),
            document: Document::new(),
            config,
        }
    }

    // === Accessors ===

    pub fn bus(&self) -> &StateBus {
        &self.bus
    }

    pub fn state(&self) -> &SessionState {
        self.bus.state()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Whether discarding the document now would lose changes
    ///
    /// Collaborators ask this before close or exit to decide whether to
    /// prompt the user.
    pub fn has_unsaved_changes(&self) -> bool {
        self.bus.is_dirty()
    }

    pub fn window_title(&self) -> String {
        self.bus.window_title()
    }

    pub fn subscribe<O>(&mut self, observer: O) -> SubscriberId
    where
        O: StateObserver + 'static,
    {
        self.bus.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }

    // === File operations ===

    /// Load `path`, replacing the open document
    ///
    /// On failure the previous document and state stay as they were and the
    /// error is shown in the status text.
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Err(e) = self
            .document
            .load_with_limit(path, self.config.max_file_size_mb)
        {
            self.report(&e);
            return Err(e);
        }

        self.bus.set_active_file(Some(path.to_path_buf()));
        self.bus.set_dirty(false);
        self.bus
            .set_status_text(format!("Loaded {}", filename_for_display(path)));
        self.reconcile();
        Ok(())
    }

    /// Write the document back to the active file
    pub fn request_save(&mut self) -> Result<()> {
        let path = self
            .bus
            .active_file()
            .map(Path::to_path_buf)
            .ok_or(StateError::NoDocument)?;
        self.save_to(path)
    }

    /// Write the document to `path`, which becomes the active file
    pub fn request_save_as(&mut self, path: impl AsRef<Path>) -> Result<()> {
        if self.bus.active_file().is_none() {
            return Err(StateError::NoDocument.into());
        }
        self.save_to(path.as_ref().to_path_buf())
    }

    fn save_to(&mut self, path: PathBuf) -> Result<()> {
        if let Err(e) = self.document.save_with(&path, self.config.line_ending) {
            self.report(&e);
            return Err(e);
        }

        self.bus.set_dirty(false);
        self.bus.set_active_file(Some(path));
        self.bus.set_status_text(STATUS_SAVED);
        self.reconcile();
        Ok(())
    }

    /// Drop the document without saving. Returns false if nothing was open.
    pub fn close_document(&mut self) -> bool {
        let was_open = self.bus.set_active_file(None);
        self.bus.clear_status_text();
        self.reconcile();
        if was_open {
            tracing::info!("closed document");
        }
        was_open
    }

    // === Editing ===

    /// Open an edit session over row `row`
    pub fn begin_edit(&mut self, row: usize) -> Result<EditSession> {
        if !self.document.is_loaded() {
            return Err(StateError::NoDocument.into());
        }

        let values = self.document.row(row).ok_or(Error::RowIndex {
            index: row,
            len: self.document.row_count(),
        })?;
        let session = EditSession::begin(row, self.document.header(), values)?
            .with_generation(self.document.generation());

        tracing::debug!(row, "began edit");
        self.bus.clear_status_text();
        self.reconcile();
        Ok(session)
    }

    /// Commit `session` into the document
    ///
    /// Returns whether the row changed. Only a change raises the dirty flag.
    /// A session opened against a document that has since been replaced or
    /// closed is cancelled and rejected.
    pub fn commit_edit(&mut self, session: &mut EditSession) -> Result<bool> {
        if session.is_open() && session.generation() != self.current_generation() {
            // Cancelling an open session cannot fail
            let _ = session.cancel();
            tracing::warn!(row = session.row(), "rejected stale edit session");
            return Err(StateError::StaleSession.into());
        }

        let commit = session.commit()?;
        let changed = self.document.commit_row(commit.row, commit.values)?;

        if changed {
            tracing::debug!(row = commit.row, fields = ?commit.changed_fields, "row updated");
            self.bus.set_dirty(true);
            self.bus.set_status_text(STATUS_TABLE_UPDATED);
        } else {
            self.bus.set_status_text(STATUS_NO_CHANGES);
        }

        self.reconcile();
        Ok(changed)
    }

    pub fn cancel_edit(&mut self, session: &mut EditSession) -> Result<()> {
        session.cancel()?;
        tracing::debug!(row = session.row(), "cancelled edit");
        Ok(())
    }

    /// Force the dirty flag on. Refused when nothing is open.
    pub fn mark_dirty(&mut self) -> bool {
        let changed = self.bus.set_dirty(true);
        self.reconcile();
        changed
    }

    fn current_generation(&self) -> Option<u64> {
        self.document
            .is_loaded()
            .then(|| self.document.generation())
    }

    fn report(&mut self, error: &Error) {
        tracing::warn!("{}", error);
        self.bus.set_status_text(error.user_message());
        self.reconcile();
    }

    /// Bring the document in line with the bus after observers ran
    ///
    /// An observer may clear the active file or point it at another file.
    /// Clearing drops the document; a new file is loaded, and if that load
    /// fails the active file is set back to the document's own path.
    fn reconcile(&mut self) {
        for _ in 0..MAX_RECONCILE_PASSES {
            let wanted = self.bus.active_file().map(Path::to_path_buf);
            if wanted.as_deref() == self.document.path() {
                return;
            }

            match wanted {
                None => {
                    tracing::debug!("active file cleared, dropping document");
                    self.document.clear();
                }
                Some(path) => {
                    match self
                        .document
                        .load_with_limit(&path, self.config.max_file_size_mb)
                    {
                        Ok(()) => {
                            self.bus.set_dirty(false);
                            self.bus
                                .set_status_text(format!("Loaded {}", filename_for_display(&path)));
                        }
                        Err(e) => {
                            tracing::warn!("{}", e);
                            let previous = self.document.path().map(Path::to_path_buf);
                            self.bus.set_active_file(previous);
                            self.bus.set_status_text(e.user_message());
                        }
                    }
                }
            }
        }

        tracing::warn!(
            "document and active file still disagree after {} passes",
            MAX_RECONCILE_PASSES
        );
    }
}
