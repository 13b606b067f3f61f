//! File naming for one job.
//!
//! Every file a task touches is derived from the job name and task indices
//! only. Two tasks never compute the same path, which is what lets map and
//! reduce tasks run side by side without locks.

use std::path::{Path, PathBuf};

const PREFIX: &str = "mrtmp.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    name: String,
    dir: PathBuf,
}

impl Job {
    /// A job whose files live in the current directory.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_dir(name, ".")
    }

    pub fn with_dir(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Intermediate file written by map task `map_task` for reduce task `reduce_task`.
    pub fn reduce_name(&self, map_task: usize, reduce_task: usize) -> PathBuf {
        self.dir
            .join(format!("{PREFIX}{}-{map_task}-{reduce_task}", self.name))
    }

    /// Output of reduce task `reduce_task`.
    pub fn merge_name(&self, reduce_task: usize) -> PathBuf {
        self.dir
            .join(format!("{PREFIX}{}-res-{reduce_task}", self.name))
    }

    /// Final, merged result of the whole job.
    pub fn ans_name(&self) -> PathBuf {
        self.dir.join(format!("{PREFIX}{}", self.name))
    }
}
