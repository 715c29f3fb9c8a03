//! Document model - the header and rows of the open CSV file
//!
//! Every row has exactly as many fields as the header. Row order is insertion
//! order and is the order written back to disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::csv::{self, LineEnding, Table};
use crate::error::{Error, Result};
use crate::util::{
    is_likely_binary, validate_file_for_opening, FileOpenError, DEFAULT_MAX_FILE_SIZE_MB,
};

/// Direction for [`Document::sorted_order`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Tabular document state - header, rows and the file they came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    /// Path the content was loaded from or last saved to
    path: Option<PathBuf>,
    /// Incremented on every wholesale replacement
    generation: u64,
}

impl Document {
    /// Create an empty document (nothing loaded)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from in-memory content, checking the field counts
    ///
    /// A document without columns cannot hold rows, as it would not survive
    /// a save.
    pub fn from_parts(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if header.is_empty() && !rows.is_empty() {
            return Err(Error::EmptyHeader { rows: rows.len() });
        }
        if let Some(bad) = rows.iter().find(|row| row.len() != header.len()) {
            return Err(Error::RowLength {
                expected: header.len(),
                found: bad.len(),
            });
        }

        Ok(Self {
            header,
            rows,
            path: None,
            generation: 0,
        })
    }

    /// Load a document from a file path
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut document = Self::new();
        document.load(path)?;
        Ok(document)
    }

    /// Replace the content wholesale with the file at `path`
    ///
    /// On failure the document is left untouched.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.load_with_limit(path, DEFAULT_MAX_FILE_SIZE_MB)
    }

    /// Like [`Document::load`], with an explicit file size limit
    pub fn load_with_limit(&mut self, path: &Path, max_size_mb: u64) -> Result<()> {
        let table = read_table(path, max_size_mb)?;

        if table.is_empty() {
            tracing::warn!(path = %path.display(), "CSV file is empty");
        }

        self.install(table, Some(path.to_path_buf()));
        tracing::info!(
            path = %path.display(),
            columns = self.column_count(),
            rows = self.row_count(),
            "loaded document"
        );
        Ok(())
    }

    /// Discard all content
    pub fn clear(&mut self) {
        self.install(Table::default(), None);
    }

    fn install(&mut self, table: Table, path: Option<PathBuf>) {
        self.header = table.header;
        self.rows = table.rows;
        self.path = path;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Write the document to `path` using the platform line ending
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.save_with(path, LineEnding::Platform)
    }

    /// Write the document to `path` atomically
    ///
    /// The content goes to a temporary file in the same directory which then
    /// replaces `path`, so a failed save leaves an existing file intact.
    pub fn save_with(&mut self, path: &Path, line_ending: LineEnding) -> Result<()> {
        let text =
            csv::encode_with(&self.header, &self.rows, line_ending).map_err(|source| {
                Error::Parse {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        write_atomically(path, text.as_bytes())?;

        self.path = Some(path.to_path_buf());
        tracing::info!(path = %path.display(), rows = self.row_count(), "saved document");
        Ok(())
    }

    /// Replace row `index` with `values`
    ///
    /// Returns whether any field actually changed; writing back identical
    /// values is a no-op.
    pub fn commit_row(&mut self, index: usize, values: Vec<String>) -> Result<bool> {
        let len = self.rows.len();
        let width = self.header.len();

        let row = self
            .rows
            .get_mut(index)
            .ok_or(Error::RowIndex { index, len })?;

        if values.len() != width {
            return Err(Error::RowLength {
                expected: width,
                found: values.len(),
            });
        }

        if *row == values {
            return Ok(false);
        }

        *row = values;
        Ok(true)
    }

    /// Row permutation ordered by the text of one column
    ///
    /// Plain string comparison, stable, and the stored row order is not
    /// touched.
    pub fn sorted_order(&self, column: usize, order: SortOrder) -> Result<Vec<usize>> {
        if column >= self.header.len() {
            return Err(Error::FieldIndex {
                index: column,
                len: self.header.len(),
            });
        }

        let mut indices: Vec<usize> = (0..self.rows.len()).collect();
        indices.sort_by(|&a, &b| {
            let (left, right) = (&self.rows[a][column], &self.rows[b][column]);
            match order {
                SortOrder::Ascending => left.cmp(right),
                SortOrder::Descending => right.cmp(left),
            }
        });
        Ok(indices)
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(|row| row.as_slice())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the document came from (or was saved to) a file
    pub fn is_loaded(&self) -> bool {
        self.path.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

fn read_table(path: &Path, max_size_mb: u64) -> Result<Table> {
    let unreadable = |reason: FileOpenError| Error::Unreadable {
        path: path.to_path_buf(),
        reason,
    };

    validate_file_for_opening(path, max_size_mb).map_err(unreadable)?;
    if is_likely_binary(path) {
        return Err(unreadable(FileOpenError::BinaryFile));
    }

    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    csv::decode_bytes(&bytes).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let io_error = |source: std::io::Error| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(io_error)?;
    temp.write_all(contents).map_err(io_error)?;
    temp.as_file().sync_all().map_err(io_error)?;

    // Keep the permissions of the file being replaced
    if let Ok(metadata) = fs::metadata(path) {
        if let Err(e) = temp.as_file().set_permissions(metadata.permissions()) {
            tracing::debug!("Could not copy permissions to {}: {}", path.display(), e);
        }
    }

    temp.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}
