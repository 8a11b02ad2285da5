//! Where session state lives between runs.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::state::SessionState;

/// File name of the default session file in the user's home directory.
pub const SESSION_FILE_NAME: &str = ".keel_session.json";

/// Failure to read or write persisted session state.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode session state: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("corrupt session file {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SessionError {
    /// Whether the error is simply a missing file, the normal first-run case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SessionError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// `~/.keel_session.json`, or the same name in the temp directory when no
/// home directory can be resolved.
pub fn default_session_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(SESSION_FILE_NAME)
}

/// Backing storage for [`SessionState`].
pub trait SessionStore: Send + Sync {
    fn save(&self, state: &SessionState) -> Result<(), SessionError>;
    fn load(&self) -> Result<SessionState, SessionError>;
}

/// Pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`default_session_path`].
    pub fn at_default_location() -> Self {
        Self::new(default_session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for JsonFileStore {
    fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        state.save_to_file(&self.path)
    }

    fn load(&self) -> Result<SessionState, SessionError> {
        SessionState::load_from_file(&self.path)
    }
}

/// Load the persisted session, or start fresh when there is none or it
/// cannot be read. Either way the session is pointed at `working_dir` and
/// the project type is detected.
pub fn load_or_fresh(store: &dyn SessionStore, working_dir: &Path) -> SessionState {
    match store.load() {
        Ok(mut state) => {
            debug!("Restored session {}", state.session_id());
            state.relocate(working_dir);
            state
        }
        Err(e) => {
            if e.is_not_found() {
                debug!("No saved session, starting fresh");
            } else {
                warn!("Could not load saved session, starting fresh: {e}");
            }
            let mut state = SessionState::new(working_dir);
            state.detect_project_type();
            state
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_uses_session_file_name() {
        assert!(default_session_path().ends_with(SESSION_FILE_NAME));
    }

    #[test]
    fn missing_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        let err = store.load().unwrap_err();
        assert!(err.is_not_found());

        let state = load_or_fresh(&store, dir.path());
        assert_eq!(state.working_dir(), dir.path());
        assert!(state.focused_files().is_empty());
        assert!(state.project_type().is_some());
    }

    #[test]
    fn corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "garbage").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(!store.load().unwrap_err().is_not_found());

        let state = load_or_fresh(&store, dir.path());
        assert!(state.bookmarks().is_empty());
    }

    #[test]
    fn saved_session_is_relocated() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("session.json"));
        let mut state = SessionState::new("/somewhere/else");
        state.add_focused_file("/somewhere/else/main.rs");
        state.set_bookmark("here", "/somewhere/else");
        store.save(&state).unwrap();

        let project = dir.path().join("proj");
        std::fs::create_dir(&project).unwrap();
        std::fs::write(project.join("go.mod"), "module x").unwrap();

        let restored = load_or_fresh(&store, &project);
        assert_eq!(restored.session_id(), state.session_id());
        assert_eq!(restored.working_dir(), project.as_path());
        assert_eq!(restored.project_root(), Some(project.as_path()));
        assert_eq!(
            restored.project_type(),
            Some(crate::session::ProjectType::Go)
        );
        assert_eq!(restored.focused_files(), state.focused_files());
        assert_eq!(restored.bookmark("here"), Some(Path::new("/somewhere/else")));
    }
}
