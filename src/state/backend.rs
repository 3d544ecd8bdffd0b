//! Storage backends for [`WorkflowState`].
//!
//! The progress tracker talks to storage only through [`StateBackend`].
//! [`FileBackend`] is the production store: a single JSON file rewritten
//! atomically. [`MemoryBackend`] keeps the serialized document in memory
//! and is used by tests and dry runs.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{Result, SetupError};

use super::WorkflowState;

/// Persistence for a workflow's progress.
pub trait StateBackend {
    /// Read the persisted state.
    ///
    /// Returns `Ok(None)` when nothing has been persisted yet.
    fn load(&self) -> Result<Option<WorkflowState>>;

    /// Replace the persisted state with `state`.
    fn save(&mut self, state: &WorkflowState) -> Result<()>;

    /// Remove the persisted artifact entirely.
    fn wipe(&mut self) -> Result<()>;

    /// Human-readable location, for messages.
    fn describe(&self) -> String;
}

/// JSON file store with write-to-temp-then-rename saves.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    read_only: bool,
}

impl FileBackend {
    /// Default file name, relative to the project root.
    pub const DEFAULT_FILE_NAME: &'static str = ".setup_progress.json";

    /// Create a backend for the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_only: false,
        }
    }

    /// Create a backend that reads the file but never writes or deletes it.
    pub fn read_only(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            read_only: true,
        }
    }

    /// Path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name: OsString = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from(Self::DEFAULT_FILE_NAME));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn persistence_error(&self, message: impl std::fmt::Display) -> SetupError {
        SetupError::StatePersistence {
            path: self.path.clone(),
            message: message.to_string(),
        }
    }
}

impl StateBackend for FileBackend {
    fn load(&self) -> Result<Option<WorkflowState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.persistence_error(e))?;
        let state = serde_json::from_str(&content).map_err(|e| self.persistence_error(e))?;
        Ok(Some(state))
    }

    /// Save state to disk using atomic write.
    ///
    /// The temp file is renamed over the real one, so a crash mid-write
    /// leaves the previous state intact.
    fn save(&mut self, state: &WorkflowState) -> Result<()> {
        if self.read_only {
            tracing::debug!("Read-only state backend, not writing {}", self.path.display());
            return Ok(());
        }

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.persistence_error(e))?;
        }

        let content =
            serde_json::to_string_pretty(state).map_err(|e| self.persistence_error(e))?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, content).map_err(|e| self.persistence_error(e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| self.persistence_error(e))?;

        Ok(())
    }

    fn wipe(&mut self) -> Result<()> {
        if self.read_only {
            return Ok(());
        }

        for path in [self.path.clone(), self.temp_path()] {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| self.persistence_error(e))?;
            }
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store holding the serialized JSON document.
///
/// Clones share the same slot, so a test can keep a handle, drop the
/// tracker, and open a new tracker on the same "file" to simulate a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slot: Rc<RefCell<Option<String>>>,
    fail_writes: bool,
}

impl MemoryBackend {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a raw document.
    pub fn with_contents(json: impl Into<String>) -> Self {
        let backend = Self::new();
        *backend.slot.borrow_mut() = Some(json.into());
        backend
    }

    /// A handle on the same slot whose writes always fail.
    pub fn failing_writes(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
            fail_writes: true,
        }
    }

    /// Raw document currently stored.
    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl StateBackend for MemoryBackend {
    fn load(&self) -> Result<Option<WorkflowState>> {
        match self.slot.borrow().as_deref() {
            None => Ok(None),
            Some(json) => serde_json::from_str(json)
                .map(Some)
                .map_err(|e| SetupError::StatePersistence {
                    path: PathBuf::from("<memory>"),
                    message: e.to_string(),
                }),
        }
    }

    fn save(&mut self, state: &WorkflowState) -> Result<()> {
        if self.fail_writes {
            return Err(SetupError::StatePersistence {
                path: PathBuf::from("<memory>"),
                message: "write refused".to_string(),
            });
        }
        let json = serde_json::to_string(state).map_err(anyhow::Error::from)?;
        *self.slot.borrow_mut() = Some(json);
        Ok(())
    }

    fn wipe(&mut self) -> Result<()> {
        *self.slot.borrow_mut() = None;
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StepStatus;
    use tempfile::TempDir;

    fn sample_state() -> WorkflowState {
        let mut state = WorkflowState::fresh("sess", ["a", "b"]);
        state.steps.get_mut("a").unwrap().status = StepStatus::Completed;
        state
    }

    #[test]
    fn file_load_nonexistent_returns_none() {
        let temp = TempDir::new().unwrap();
        let backend = FileBackend::new(temp.path().join("progress.json"));
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn file_save_and_load() {
        let temp = TempDir::new().unwrap();
        let mut backend = FileBackend::new(temp.path().join("progress.json"));

        backend.save(&sample_state()).unwrap();
        let loaded = backend.load().unwrap().unwrap();

        assert_eq!(loaded, sample_state());
    }

    #[test]
    fn save_uses_atomic_write() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".setup_progress.json");
        let mut backend = FileBackend::new(&path);

        backend.save(&sample_state()).unwrap();

        assert!(path.exists());
        assert!(
            !temp.path().join(".setup_progress.json.tmp").exists(),
            "Temp file should not exist after successful save"
        );
    }

    #[test]
    fn save_creates_parent_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("state.json");
        let mut backend = FileBackend::new(&path);

        backend.save(&sample_state()).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("progress.json");
        fs::write(&path, "{not json").unwrap();

        let err = FileBackend::new(&path).load().unwrap_err();
        assert!(matches!(err, SetupError::StatePersistence { .. }));
    }

    #[test]
    fn wipe_removes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("progress.json");
        let mut backend = FileBackend::new(&path);
        backend.save(&sample_state()).unwrap();

        backend.wipe().unwrap();

        assert!(!path.exists());
        // Wiping twice is fine
        backend.wipe().unwrap();
    }

    #[test]
    fn read_only_never_writes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("progress.json");
        let mut backend = FileBackend::read_only(&path);

        backend.save(&sample_state()).unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn read_only_keeps_file_on_wipe() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("progress.json");
        FileBackend::new(&path).save(&sample_state()).unwrap();

        FileBackend::read_only(&path).wipe().unwrap();

        assert!(path.exists());
    }

    #[test]
    fn memory_clones_share_slot() {
        let mut backend = MemoryBackend::new();
        let observer = backend.clone();

        backend.save(&sample_state()).unwrap();

        assert_eq!(observer.load().unwrap().unwrap(), sample_state());
    }

    #[test]
    fn memory_failing_writes() {
        let backend = MemoryBackend::new();
        let mut failing = backend.failing_writes();

        assert!(failing.save(&sample_state()).is_err());
        assert!(backend.contents().is_none());
    }

    #[test]
    fn memory_with_garbage_fails_to_load() {
        let backend = MemoryBackend::with_contents("garbage");
        assert!(backend.load().is_err());
    }
}
