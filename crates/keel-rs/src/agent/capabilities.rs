//! Narrow capability traits the slash commands operate through.
//!
//! Each command names the capabilities it needs instead of reaching into the
//! agent. [`CommandTarget`] bundles all of them and is implemented for any
//! type that implements every capability.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::context::ContextStats;

/// Conversation history and context window.
pub trait ConversationControl {
    fn clear_conversation(&mut self);
    fn context_stats(&self) -> ContextStats;
    fn context_usage_percentage(&self) -> f64;
}

/// Current task and task history.
pub trait TaskControl {
    fn current_task(&self) -> &str;
    fn set_current_task(&mut self, task: &str);
    /// Returns the description of the completed task, `None` when no task
    /// was set.
    fn complete_current_task(&mut self, files_changed: Vec<PathBuf>) -> Option<String>;
    fn session_summary(&self) -> String;
}

/// Focused files and workspace facts.
pub trait FocusControl {
    fn focused_files(&self) -> &[PathBuf];
    fn add_focused_file(&mut self, path: PathBuf);
    fn clear_focused_files(&mut self);
    /// Directory relative paths are resolved against.
    fn working_dir(&self) -> &Path;
    fn workspace_info(&self) -> String;
}

/// Named path bookmarks.
pub trait BookmarkControl {
    fn bookmark(&self, name: &str) -> Option<&Path>;
    fn set_bookmark(&mut self, name: &str, path: PathBuf);
    fn bookmarks(&self) -> &BTreeMap<String, PathBuf>;
}

/// Active model selection.
pub trait ModelControl {
    fn current_model(&self) -> &str;
    fn set_model(&mut self, model: &str);
}

/// Verbose output toggle.
pub trait VerbosityControl {
    fn is_verbose(&self) -> bool;
    fn set_verbose(&mut self, verbose: bool);
}

/// Everything a command may need.
pub trait CommandTarget:
    ConversationControl + TaskControl + FocusControl + BookmarkControl + ModelControl + VerbosityControl
{
}

impl<T> CommandTarget for T where
    T: ConversationControl
        + TaskControl
        + FocusControl
        + BookmarkControl
        + ModelControl
        + VerbosityControl
{
}
