//! Utility modules

pub mod file_validation;

pub use file_validation::{
    filename_for_display, is_likely_binary, validate_file_for_opening, FileOpenError,
    DEFAULT_MAX_FILE_SIZE_MB,
};
