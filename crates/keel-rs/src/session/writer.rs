//! Fire-and-forget session persistence.
//!
//! Saving the session must never stall a turn or fail it. [`SessionWriter`]
//! hands snapshots to a background task that writes only the newest one
//! queued, and logs failures instead of returning them. [`flush`] waits for
//! the queue to drain so nothing is lost at exit.
//!
//! [`flush`]: SessionWriter::flush

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::state::SessionState;
use super::store::SessionStore;

struct Worker {
    tx: mpsc::UnboundedSender<SessionState>,
    handle: JoinHandle<()>,
}

/// Background writer for [`SessionState`] snapshots.
pub struct SessionWriter {
    store: Arc<dyn SessionStore>,
    worker: Mutex<Option<Worker>>,
}

impl std::fmt::Debug for SessionWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionWriter").finish_non_exhaustive()
    }
}

impl SessionWriter {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            worker: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Queue a snapshot for saving. Returns immediately.
    ///
    /// Outside a tokio runtime the snapshot is saved synchronously instead.
    pub fn submit(&self, state: SessionState) {
        if tokio::runtime::Handle::try_current().is_err() {
            save_logged(self.store.as_ref(), &state);
            return;
        }

        let mut slot = self.worker.lock().unwrap_or_else(|e| e.into_inner());
        let worker = slot.get_or_insert_with(|| spawn_worker(Arc::clone(&self.store)));
        if let Err(mpsc::error::SendError(state)) = worker.tx.send(state) {
            // Worker died; save inline and replace it on the next submit.
            save_logged(self.store.as_ref(), &state);
            *slot = None;
        }
    }

    /// Wait until every queued snapshot has been written.
    pub async fn flush(&self) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(Worker { tx, handle }) = worker else {
            return;
        };
        drop(tx);
        if let Err(e) = handle.await {
            warn!("Session writer task failed: {e}");
        }
    }
}

fn spawn_worker(store: Arc<dyn SessionStore>) -> Worker {
    let (tx, mut rx) = mpsc::unbounded_channel::<SessionState>();
    let handle = tokio::spawn(async move {
        while let Some(mut state) = rx.recv().await {
            // Only the newest snapshot matters.
            while let Ok(newer) = rx.try_recv() {
                state = newer;
            }
            let store = Arc::clone(&store);
            match tokio::task::spawn_blocking(move || save_logged(store.as_ref(), &state)).await {
                Ok(()) => {}
                Err(e) => warn!("Session save task failed: {e}"),
            }
        }
    });
    Worker { tx, handle }
}

fn save_logged(store: &dyn SessionStore, state: &SessionState) {
    match store.save(state) {
        Ok(()) => debug!("Saved session {}", state.session_id()),
        Err(e) => warn!("Failed to save session: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{JsonFileStore, SessionError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingStore {
        attempts: AtomicUsize,
    }

    impl SessionStore for FailingStore {
        fn save(&self, _state: &SessionState) -> Result<(), SessionError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(SessionError::Io {
                path: "/nowhere".into(),
                source: std::io::Error::other("disk full"),
            })
        }

        fn load(&self) -> Result<SessionState, SessionError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn flush_persists_latest_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path().join("s.json")));
        let writer = SessionWriter::new(store.clone());

        let mut state = SessionState::new(dir.path());
        for i in 0..5 {
            state.set_current_task(format!("task {i}"));
            writer.submit(state.clone());
        }
        writer.flush().await;

        let loaded = store.load().unwrap();
        assert_eq!(loaded.current_task(), "task 4");
    }

    #[tokio::test]
    async fn writer_is_reusable_after_flush() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path().join("s.json")));
        let writer = SessionWriter::new(store.clone());

        let mut state = SessionState::new(dir.path());
        state.set_current_task("first");
        writer.submit(state.clone());
        writer.flush().await;

        state.set_current_task("second");
        writer.submit(state);
        writer.flush().await;

        assert_eq!(store.load().unwrap().current_task(), "second");
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let store = Arc::new(FailingStore {
            attempts: AtomicUsize::new(0),
        });
        let writer = SessionWriter::new(store.clone());
        writer.submit(SessionState::new("/tmp"));
        writer.flush().await;
        assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn flush_without_submissions_returns() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SessionWriter::new(Arc::new(JsonFileStore::new(dir.path().join("s.json"))));
        writer.flush().await;
        assert!(!dir.path().join("s.json").exists());
    }

    #[test]
    fn saves_inline_outside_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let writer = SessionWriter::new(Arc::new(JsonFileStore::new(&path)));
        writer.submit(SessionState::new(dir.path()));
        assert!(path.exists());
    }
}
