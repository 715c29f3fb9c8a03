//! Application model - the document, its edit sessions and the session state
//!
//! These types hold data only. Change propagation lives in [`crate::bus`] and
//! orchestration in [`crate::app`].

pub mod document;
pub mod edit_session;
pub mod state;

pub use document::{Document, SortOrder};
pub use edit_session::{EditCommit, EditSession};
pub use state::{ActiveView, SessionState};
