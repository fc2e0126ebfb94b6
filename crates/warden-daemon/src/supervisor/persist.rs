use parking_lot::Mutex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use warden_types::{SupervisorState, WardenError, WardenResult};

/// Writer for the state artifact read by health checks and the API fallback.
///
/// Each write lands in a sibling temp file that is renamed over the target,
/// so readers see either the previous or the next snapshot.
pub struct StateStore {
    path: PathBuf,
    writer: Mutex<()>,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes writers; callers take their snapshot while holding the
    /// returned guard so snapshots reach disk in the order they were taken.
    pub(crate) fn lock(&self) -> parking_lot::MutexGuard<'_, ()> {
        self.writer.lock()
    }

    pub(crate) fn write_locked(&self, state: &SupervisorState) -> WardenResult<()> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| WardenError::Serialization(format!("Failed to encode state: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        let mut file = std::fs::File::create(&tmp)
            .map_err(|e| WardenError::Io(format!("Failed to create {:?}: {}", tmp, e)))?;
        file.write_all(json.as_bytes())
            .map_err(|e| WardenError::Io(format!("Failed to write {:?}: {}", tmp, e)))?;
        drop(file);

        std::fs::rename(&tmp, &self.path)
            .map_err(|e| WardenError::Io(format!("Failed to replace {:?}: {}", self.path, e)))
    }

    /// Best effort: failures are logged and swallowed.
    #[cfg(test)]
    pub(crate) fn write(&self, state: &SupervisorState) {
        let _guard = self.lock();
        if let Err(e) = self.write_locked(state) {
            tracing::warn!("Failed to write state: {}", e);
        }
    }
}

/// `Ok(None)` when the supervisor has not written anything yet.
pub fn read_state(path: &Path) -> WardenResult<Option<SupervisorState>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(WardenError::Io(format!("Failed to read {:?}: {}", path, e))),
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| WardenError::Serialization(format!("Failed to parse state: {}", e)))
}

pub fn state_age(path: &Path) -> WardenResult<Option<Duration>> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(WardenError::Io(format!("Failed to stat {:?}: {}", path, e))),
    };

    let modified = metadata
        .modified()
        .map_err(|e| WardenError::Io(format!("No mtime for {:?}: {}", path, e)))?;

    Ok(Some(
        SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use warden_types::ServerState;

    #[test]
    fn test_write_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));

        let now = Utc::now();
        let mut state = SupervisorState {
            state: ServerState::Running,
            pid: Some(4242),
            started_at: Some(now),
            restart_count: 3,
            last_exit_code: Some(-9),
            last_crash_time: Some(now),
            auto_restart: false,
            maintenance: false,
            message: "Server running".into(),
            ..Default::default()
        };
        state.refresh(now);
        store.write(&state);

        let read = read_state(store.path()).unwrap().expect("state written");
        assert_eq!(read.state, state.state);
        assert_eq!(read.pid, state.pid);
        assert_eq!(read.started_at, state.started_at);
        assert_eq!(read.restart_count, state.restart_count);
        assert_eq!(read.last_exit_code, state.last_exit_code);
        assert_eq!(read.last_crash_time, state.last_crash_time);
        assert_eq!(read.auto_restart, state.auto_restart);
        assert_eq!(read.maintenance, state.maintenance);
        assert_eq!(read.message, state.message);
        assert!(!dir.path().join("state.json.tmp").exists());
    }

    #[test]
    fn test_missing_artifact_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        assert!(read_state(store.path()).unwrap().is_none());
        assert!(state_age(store.path()).unwrap().is_none());
    }

    #[test]
    fn test_fresh_artifact_has_small_age() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        store.write(&SupervisorState::default());
        let age = state_age(store.path()).unwrap().unwrap();
        assert!(age < Duration::from_secs(5));
    }

    #[test]
    fn test_write_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("missing").join("state.json"));
        store.write(&SupervisorState::default());
        assert!(read_state(store.path()).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_artifact_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(read_state(&path).is_err());
    }
}
