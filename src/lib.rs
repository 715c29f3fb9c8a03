//! csvpad - a single-document CSV table editor core
//!
//! This crate provides the document model, the row edit transaction, the CSV
//! codec and the observable session state that a presentation layer drives.

pub mod app;
pub mod bus;
pub mod cli;
pub mod config;
pub mod config_paths;
pub mod csv;
pub mod error;
pub mod messages;
pub mod model;
pub mod tracing;
pub mod util;

/// Product name shown in window titles
pub const PRODUCT_TITLE: &str = "csvpad";

// Re-export commonly used types
pub use app::App;
pub use bus::{StateBus, StateObserver, SubscriberId};
pub use config::EditorConfig;
pub use error::{Error, ErrorKind, Result, StateError};
pub use messages::StateChange;
pub use model::{ActiveView, Document, EditSession, SessionState};
