//! Persisted task state
//!
//! After a task succeeds the SHA-256 digest of each of its file dependencies
//! is written to `.doable/state.json`. A later run compares the current
//! digests against these to decide whether the inputs changed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::task::TaskDescriptor;
use crate::types::{DoableError, DoableResult};

pub const STATE_DIR: &str = ".doable";
pub const STATE_FILE: &str = "state.json";

/// What was observed when a task last succeeded
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// File dependency path (as declared) to hex digest
    pub file_dep: BTreeMap<String, String>,
}

#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    records: BTreeMap<String, TaskRecord>,
}

impl StateStore {
    /// Load the store for `root`; a missing file is an empty store
    pub fn load(root: &Path) -> DoableResult<Self> {
        let path = root.join(STATE_DIR).join(STATE_FILE);
        let records = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|e| {
                DoableError::Config(format!(
                    "Corrupt state file {}: {} (run `doable forget` to reset)",
                    path.display(),
                    e
                ))
            })?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, task: &str) -> Option<&TaskRecord> {
        self.records.get(task)
    }

    pub fn record(&mut self, task: &str, record: TaskRecord) {
        self.records.insert(task.to_string(), record);
    }

    /// Drop the record of one task, returning whether it existed
    pub fn forget(&mut self, task: &str) -> bool {
        self.records.remove(task).is_some()
    }

    pub fn forget_all(&mut self) {
        self.records.clear();
    }

    pub fn save(&self) -> DoableResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), tasks = self.records.len(), "saved state");
        Ok(())
    }
}

/// Hex SHA-256 of a file's contents
pub fn digest_file(path: &Path) -> DoableResult<String> {
    let bytes = fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Digest every file dependency of `task`, resolved against `root`
pub fn digest_file_deps(root: &Path, task: &TaskDescriptor) -> DoableResult<TaskRecord> {
    let mut record = TaskRecord::default();
    for dep in &task.file_dep {
        let full = root.join(dep);
        if !full.exists() {
            return Err(DoableError::MissingFileDep {
                task: task.name.clone(),
                path: dep.display().to_string(),
            });
        }
        record
            .file_dep
            .insert(dep.display().to_string(), digest_file(&full)?);
    }
    Ok(record)
}
