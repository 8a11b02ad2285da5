//! Durable per-user session facts.
//!
//! [`SessionState`] records what the user is working on: focused and recent
//! files, the current task and completed ones, bookmarks, and project
//! metadata. It is rendered into the system preamble every turn and written
//! to disk after every turn, so a new process picks up where the last one
//! stopped.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::project::{ProjectType, find_project_root};
use super::store::SessionError;

/// Most focused files kept, most recent first.
pub const MAX_FOCUSED_FILES: usize = 10;

/// Most recent files kept, most recent first.
pub const MAX_RECENT_FILES: usize = 20;

/// Focused files shown by [`SessionState::context_summary`].
const SUMMARY_FOCUSED_SHOWN: usize = 5;

/// Recent files shown by [`SessionState::context_summary`].
const SUMMARY_RECENT_SHOWN: usize = 3;

/// A task that was finished during the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTask {
    pub description: String,
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub files_changed: Vec<PathBuf>,
}

/// Session bookkeeping that outlives a single conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    session_id: String,
    working_dir: PathBuf,
    #[serde(default)]
    project_root: Option<PathBuf>,
    #[serde(default)]
    project_type: Option<ProjectType>,
    #[serde(default)]
    focused_files: Vec<PathBuf>,
    #[serde(default)]
    recent_files: Vec<PathBuf>,
    #[serde(default)]
    current_task: String,
    #[serde(default)]
    task_history: Vec<CompletedTask>,
    #[serde(default)]
    bookmarks: BTreeMap<String, PathBuf>,
    #[serde(default)]
    preferences: BTreeMap<String, String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Remove `path` if present, put it first, and cap the list at `max`.
fn push_front_capped(list: &mut Vec<PathBuf>, path: PathBuf, max: usize) {
    list.retain(|p| *p != path);
    list.insert(0, path);
    list.truncate(max);
}

impl SessionState {
    /// Fresh state for `working_dir`. The project root is discovered by
    /// walking up to the nearest directory with a root marker; the project
    /// type is left undetected.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        let now = Utc::now();
        Self {
            session_id: format!("session-{}", now.format("%Y%m%d-%H%M%S")),
            project_root: Some(find_project_root(&working_dir)),
            working_dir,
            project_type: None,
            focused_files: Vec::new(),
            recent_files: Vec::new(),
            current_task: String::new(),
            task_history: Vec::new(),
            bookmarks: BTreeMap::new(),
            preferences: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // ── Files ──────────────────────────────────────────────────────

    /// Put `path` at the front of the focused list, dropping any earlier
    /// occurrence and anything past [`MAX_FOCUSED_FILES`].
    pub fn add_focused_file(&mut self, path: impl Into<PathBuf>) {
        push_front_capped(&mut self.focused_files, path.into(), MAX_FOCUSED_FILES);
        self.touch();
    }

    /// Returns whether the path was focused.
    pub fn remove_focused_file(&mut self, path: &Path) -> bool {
        let before = self.focused_files.len();
        self.focused_files.retain(|p| p != path);
        self.touch();
        self.focused_files.len() != before
    }

    pub fn clear_focused_files(&mut self) {
        self.focused_files.clear();
        self.touch();
    }

    pub fn focused_files(&self) -> &[PathBuf] {
        &self.focused_files
    }

    /// Same policy as [`add_focused_file`](Self::add_focused_file), capped at
    /// [`MAX_RECENT_FILES`]. The two lists are independent.
    pub fn add_recent_file(&mut self, path: impl Into<PathBuf>) {
        push_front_capped(&mut self.recent_files, path.into(), MAX_RECENT_FILES);
        self.touch();
    }

    pub fn recent_files(&self) -> &[PathBuf] {
        &self.recent_files
    }

    // ── Tasks ──────────────────────────────────────────────────────

    /// Set the current task. An empty string clears it.
    pub fn set_current_task(&mut self, task: impl Into<String>) {
        self.current_task = task.into();
        self.touch();
    }

    /// The current task, empty when there is none.
    pub fn current_task(&self) -> &str {
        &self.current_task
    }

    pub fn has_current_task(&self) -> bool {
        !self.current_task.is_empty()
    }

    /// Move the current task into history. Does nothing (and returns `None`)
    /// when no task is set.
    pub fn complete_current_task(&mut self, files_changed: Vec<PathBuf>) -> Option<&CompletedTask> {
        if self.current_task.is_empty() {
            return None;
        }
        let task = CompletedTask {
            description: std::mem::take(&mut self.current_task),
            completed_at: Utc::now(),
            files_changed,
        };
        debug!("Completed task: {}", task.description);
        self.task_history.push(task);
        self.touch();
        self.task_history.last()
    }

    pub fn task_history(&self) -> &[CompletedTask] {
        &self.task_history
    }

    // ── Bookmarks ──────────────────────────────────────────────────

    /// Bookmark `path` under `name`, replacing any previous target. The path
    /// is not checked.
    pub fn set_bookmark(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.bookmarks.insert(name.into(), path.into());
        self.touch();
    }

    pub fn bookmark(&self, name: &str) -> Option<&Path> {
        self.bookmarks.get(name).map(PathBuf::as_path)
    }

    /// Returns whether a bookmark was removed.
    pub fn remove_bookmark(&mut self, name: &str) -> bool {
        let removed = self.bookmarks.remove(name).is_some();
        if removed {
            self.touch();
        }
        removed
    }

    /// All bookmarks, ordered by name.
    pub fn bookmarks(&self) -> &BTreeMap<String, PathBuf> {
        &self.bookmarks
    }

    // ── Preferences ────────────────────────────────────────────────

    pub fn set_preference(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.preferences.insert(key.into(), value.into());
        self.touch();
    }

    pub fn preference(&self, key: &str) -> Option<&str> {
        self.preferences.get(key).map(String::as_str)
    }

    // ── Project ────────────────────────────────────────────────────

    /// Classify the project root by its build manifests. No-op when there
    /// is no project root.
    pub fn detect_project_type(&mut self) {
        let Some(root) = self.project_root.as_deref() else {
            return;
        };
        let kind = ProjectType::detect(root);
        debug!("Detected project type {kind} at {}", root.display());
        self.project_type = Some(kind);
        self.touch();
    }

    /// Point the session at a new working directory, rediscovering the
    /// project root and type. Files, tasks and bookmarks are kept.
    pub fn relocate(&mut self, working_dir: impl Into<PathBuf>) {
        self.working_dir = working_dir.into();
        self.project_root = Some(find_project_root(&self.working_dir));
        self.project_type = None;
        self.detect_project_type();
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    pub fn project_type(&self) -> Option<ProjectType> {
        self.project_type
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ── Rendering ──────────────────────────────────────────────────

    /// Human-readable digest of the session.
    pub fn context_summary(&self) -> String {
        let mut out = String::from("Session Context Summary\n======================\n");
        let _ = writeln!(out, "Working Directory: {}", self.working_dir.display());
        if let Some(root) = &self.project_root {
            let _ = writeln!(out, "Project Root: {}", root.display());
        }
        if let Some(kind) = self.project_type {
            let _ = writeln!(out, "Project Type: {kind}");
        }
        if !self.current_task.is_empty() {
            let _ = writeln!(out, "Current Task: {}", self.current_task);
        }
        write_file_list(&mut out, "Focused Files", &self.focused_files, SUMMARY_FOCUSED_SHOWN);
        write_file_list(&mut out, "Recent Files", &self.recent_files, SUMMARY_RECENT_SHOWN);
        if let Some(last) = self.task_history.last() {
            let _ = writeln!(out, "Completed Tasks: {}", self.task_history.len());
            let _ = writeln!(
                out,
                "  Last: {} (completed {})",
                last.description,
                last.completed_at.with_timezone(&Local).format("%H:%M")
            );
        }
        out
    }

    /// Working directory, project root and project type on three lines.
    pub fn workspace_info(&self) -> String {
        format!(
            "Working Directory: {}\nProject Root: {}\nProject Type: {}",
            self.working_dir.display(),
            self.project_root
                .as_deref()
                .map_or_else(|| "(none)".to_string(), |p| p.display().to_string()),
            self.project_type
                .map_or_else(|| "(not detected)".to_string(), |k| k.to_string()),
        )
    }

    // ── Persistence ────────────────────────────────────────────────

    /// Atomic write: serialize to a temp file beside `path`, then rename
    /// into place. Creates the parent directory if needed.
    pub fn save_to_file(&self, path: &Path) -> Result<(), SessionError> {
        let io_err = |source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let file_name = path
            .file_name()
            .map_or_else(|| "session".into(), |n| n.to_string_lossy().into_owned());
        let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

        let json = serde_json::to_string_pretty(self).map_err(SessionError::Encode)?;
        std::fs::write(&tmp_path, json).map_err(io_err)?;
        std::fs::rename(&tmp_path, path).map_err(io_err)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, SessionError> {
        let json = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| SessionError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn write_file_list(out: &mut String, heading: &str, files: &[PathBuf], shown: usize) {
    if files.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading} ({}):", files.len());
    for file in files.iter().take(shown) {
        let _ = writeln!(out, "  - {}", file.display());
    }
    if files.len() > shown {
        let _ = writeln!(out, "  ... and {} more", files.len() - shown);
    }
}
