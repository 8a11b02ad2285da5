//! Session state that survives across turns and across runs.
//!
//! [`SessionState`] tracks focused and recent files, tasks, bookmarks and
//! the detected project. [`SessionStore`] abstracts where it is kept
//! ([`JsonFileStore`] by default) and [`SessionWriter`] saves it in the
//! background after every turn.

pub mod project;
pub mod state;
pub mod store;
pub mod writer;

pub use project::{ProjectType, ROOT_MARKERS, absolutize, find_project_root};
pub use state::{CompletedTask, MAX_FOCUSED_FILES, MAX_RECENT_FILES, SessionState};
pub use store::{
    JsonFileStore, SESSION_FILE_NAME, SessionError, SessionStore, default_session_path,
    load_or_fresh,
};
pub use writer::SessionWriter;
