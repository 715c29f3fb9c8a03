//! File validation before a document is loaded
//!
//! Rejects paths that cannot possibly hold a CSV document:
//! - Missing files and directories
//! - Unreadable files
//! - Files above the configured size limit
//! - Binary files (NUL bytes in the first block)

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

/// Default maximum file size in megabytes
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 50;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Errors that can occur when validating a file for opening
#[derive(Debug, Clone, PartialEq)]
pub enum FileOpenError {
    /// File does not exist
    NotFound,
    /// Permission denied to read file
    PermissionDenied,
    /// Path is a directory, not a file
    IsDirectory,
    /// File appears to be binary (contains null bytes)
    BinaryFile,
    /// File exceeds size limit
    TooLarge { size_mb: f64, limit_mb: u64 },
    /// Other I/O error
    IoError(String),
}

impl FileOpenError {
    /// Get a user-friendly error message
    pub fn user_message(&self, filename: &str) -> String {
        match self {
            Self::NotFound => format!("File not found: {}", filename),
            Self::PermissionDenied => format!("Permission denied: {}", filename),
            Self::IsDirectory => format!("Cannot open directory: {}", filename),
            Self::BinaryFile => format!("Cannot open binary file: {}", filename),
            Self::TooLarge { size_mb, limit_mb } => {
                format!(
                    "{} is too large ({:.1} MB, max {} MB)",
                    filename, size_mb, limit_mb
                )
            }
            Self::IoError(msg) => format!("Error opening {}: {}", filename, msg),
        }
    }
}

impl std::fmt::Display for FileOpenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "file not found"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::IsDirectory => write!(f, "is a directory"),
            Self::BinaryFile => write!(f, "binary file"),
            Self::TooLarge { size_mb, .. } => write!(f, "file too large ({:.1} MB)", size_mb),
            Self::IoError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for FileOpenError {}

/// Validate a file before attempting to open it
///
/// Checks existence, that the path is not a directory, and the size limit.
/// Does NOT check for binary content (use `is_likely_binary` separately after this passes)
pub fn validate_file_for_opening(path: &Path, max_size_mb: u64) -> Result<(), FileOpenError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FileOpenError::NotFound,
        std::io::ErrorKind::PermissionDenied => FileOpenError::PermissionDenied,
        _ => FileOpenError::IoError(e.to_string()),
    })?;

    if metadata.is_dir() {
        return Err(FileOpenError::IsDirectory);
    }

    if metadata.len() > max_size_mb.saturating_mul(BYTES_PER_MB) {
        return Err(FileOpenError::TooLarge {
            size_mb: metadata.len() as f64 / BYTES_PER_MB as f64,
            limit_mb: max_size_mb,
        });
    }

    Ok(())
}

/// Check if a file is likely binary by scanning for null bytes
///
/// Reads the first 8KB of the file. Returns `false` on any read error (let
/// the actual open fail with a better error).
pub fn is_likely_binary(path: &Path) -> bool {
    let Ok(mut file) = File::open(path) else {
        return false;
    };

    let mut buffer = [0u8; 8192];
    let Ok(bytes_read) = file.read(&mut buffer) else {
        return false;
    };

    buffer[..bytes_read].contains(&0)
}

/// Get the filename from a path for display in error messages
pub fn filename_for_display(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_validate_nonexistent_file() {
        let result = validate_file_for_opening(
            Path::new("/nonexistent/path/file.csv"),
            DEFAULT_MAX_FILE_SIZE_MB,
        );
        assert!(matches!(result, Err(FileOpenError::NotFound)));
    }

    #[test]
    fn test_validate_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = validate_file_for_opening(dir.path(), DEFAULT_MAX_FILE_SIZE_MB);
        assert!(matches!(result, Err(FileOpenError::IsDirectory)));
    }

    #[test]
    fn test_validate_valid_file() {
        let temp = NamedTempFile::new().unwrap();
        let result = validate_file_for_opening(temp.path(), DEFAULT_MAX_FILE_SIZE_MB);
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_size_limit() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"a,b\n1,2\n").unwrap();
        temp.flush().unwrap();

        let result = validate_file_for_opening(temp.path(), 0);
        assert!(matches!(
            result,
            Err(FileOpenError::TooLarge { limit_mb: 0, .. })
        ));
    }

    #[test]
    fn test_is_binary_text_file() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "name,age").unwrap();
        writeln!(temp, "Alice,30").unwrap();
        temp.flush().unwrap();

        assert!(!is_likely_binary(temp.path()));
    }

    #[test]
    fn test_is_binary_with_null_bytes() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"Hello\x00World").unwrap();
        temp.flush().unwrap();

        assert!(is_likely_binary(temp.path()));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FileOpenError::NotFound.user_message("test.csv"),
            "File not found: test.csv"
        );
        assert_eq!(
            FileOpenError::IsDirectory.user_message("mydir"),
            "Cannot open directory: mydir"
        );
        assert_eq!(
            FileOpenError::TooLarge {
                size_mb: 75.0,
                limit_mb: 50
            }
            .user_message("big.csv"),
            "big.csv is too large (75.0 MB, max 50 MB)"
        );
    }

    #[test]
    fn test_filename_for_display() {
        assert_eq!(filename_for_display(Path::new("/tmp/x/data.csv")), "data.csv");
    }
}
