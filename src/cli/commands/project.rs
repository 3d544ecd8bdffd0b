//! Configuration and progress shared by the commands.

use std::path::{Path, PathBuf};

use crate::config::{load_config, validate, SetupConfig};
use crate::error::Result;
use crate::runner::{ProgressTracker, StepTable};
use crate::state::FileBackend;

/// A loaded, validated project.
#[derive(Debug)]
pub struct Project {
    /// Project root; commands run and files are written here.
    pub root: PathBuf,
    /// Merged configuration.
    pub config: SetupConfig,
    /// Step definition table.
    pub table: StepTable,
}

impl Project {
    /// Load and validate the configuration for `root`.
    pub fn load(root: &Path, config_override: Option<&Path>) -> Result<Self> {
        let config = load_config(root, config_override)?;
        let table = StepTable::builtin()?;
        validate(&config, &table)?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
            table,
        })
    }

    /// Location of the progress file.
    pub fn state_path(&self) -> PathBuf {
        self.root.join(&self.config.state_file)
    }

    /// Tracker persisting to the progress file.
    pub fn tracker(&self) -> ProgressTracker {
        ProgressTracker::open(self.table.clone(), FileBackend::new(self.state_path()))
    }

    /// Tracker that reads the progress file but never writes it.
    pub fn read_only_tracker(&self) -> ProgressTracker {
        ProgressTracker::open(self.table.clone(), FileBackend::read_only(self.state_path()))
    }
}
