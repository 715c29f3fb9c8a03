//! Row edit transaction
//!
//! An `EditSession` snapshots one row, stages proposed field values against
//! that snapshot and reports the change set on commit. It never touches the
//! document itself; the controller writes the committed values back.

use crate::error::{Error, Result, StateError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Open,
    Committed,
    Cancelled,
}

/// Result of a successful [`EditSession::commit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCommit {
    /// Row the session was opened on
    pub row: usize,
    /// Whether any field differs from its original value
    pub changed: bool,
    /// Indices of the fields that differ
    pub changed_fields: Vec<usize>,
    /// The full proposed row, whether or not anything changed
    pub values: Vec<String>,
}

/// Staged edits for exactly one row
#[derive(Debug, Clone)]
pub struct EditSession {
    row: usize,
    /// Document generation the session was opened against
    generation: Option<u64>,
    columns: Vec<String>,
    original: Vec<String>,
    proposed: Vec<String>,
    phase: Phase,
}

impl EditSession {
    /// Open a session over `values`, the current content of `row`
    ///
    /// Fails if the row and header lengths disagree.
    pub fn begin(row: usize, columns: &[String], values: &[String]) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(Error::RowLength {
                expected: columns.len(),
                found: values.len(),
            });
        }

        Ok(Self {
            row,
            generation: None,
            columns: columns.to_vec(),
            original: values.to_vec(),
            proposed: values.to_vec(),
            phase: Phase::Open,
        })
    }

    /// Tag the session with the document generation it belongs to
    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn generation(&self) -> Option<u64> {
        self.generation
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn original(&self) -> &[String] {
        &self.original
    }

    pub fn is_open(&self) -> bool {
        self.phase == Phase::Open
    }

    fn ensure_open(&self) -> Result<()> {
        match self.phase {
            Phase::Open => Ok(()),
            Phase::Committed => Err(StateError::AlreadyCommitted.into()),
            Phase::Cancelled => Err(StateError::Cancelled.into()),
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.proposed.len() {
            Ok(())
        } else {
            Err(Error::FieldIndex {
                index,
                len: self.proposed.len(),
            })
        }
    }

    /// Current proposed value of field `index`
    pub fn field(&self, index: usize) -> Result<&str> {
        self.check_index(index)?;
        Ok(&self.proposed[index])
    }

    /// Stage a new value for field `index`
    ///
    /// An out-of-range index cancels the session.
    pub fn set_field(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        if let Err(e) = self.check_index(index) {
            self.phase = Phase::Cancelled;
            return Err(e);
        }
        self.proposed[index] = value.into();
        Ok(())
    }

    /// Exact textual comparison against the snapshot
    pub fn is_field_changed(&self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        Ok(self.proposed[index] != self.original[index])
    }

    pub fn changed_fields(&self) -> Vec<usize> {
        self.proposed
            .iter()
            .zip(&self.original)
            .enumerate()
            .filter(|(_, (proposed, original))| proposed != original)
            .map(|(i, _)| i)
            .collect()
    }

    /// Close the session and return its change set
    ///
    /// May succeed at most once.
    pub fn commit(&mut self) -> Result<EditCommit> {
        self.ensure_open()?;
        self.phase = Phase::Committed;

        let changed_fields = self.changed_fields();
        Ok(EditCommit {
            row: self.row,
            changed: !changed_fields.is_empty(),
            changed_fields,
            values: self.proposed.clone(),
        })
    }

    /// Discard the session
    ///
    /// Cancelling twice is harmless; cancelling after a commit is an error.
    pub fn cancel(&mut self) -> Result<()> {
        match self.phase {
            Phase::Committed => Err(StateError::AlreadyCommitted.into()),
            _ => {
                self.phase = Phase::Cancelled;
                Ok(())
            }
        }
    }
}
