use std::{fmt::Display, path::PathBuf};

use common::{App, Error, Job, Result};
use tracing::{info, warn};

use crate::{map::do_map, reduce::do_reduce};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    Map {
        index: usize,
        input: PathBuf,
        n_reduce: usize,
    },
    Reduce {
        index: usize,
        n_map: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct Task {
    kind: TaskKind,
    state: TaskState,
}

impl Task {
    pub fn map(index: usize, input: impl Into<PathBuf>, n_reduce: usize) -> Self {
        Self::new(TaskKind::Map {
            index,
            input: input.into(),
            n_reduce,
        })
    }

    pub fn reduce(index: usize, n_map: usize) -> Self {
        Self::new(TaskKind::Reduce { index, n_map })
    }

    fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            state: TaskState::Pending,
        }
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Puts a finished task back to `Pending` so the whole task can be run again.
    pub fn reset(&mut self) {
        if self.state != TaskState::Running {
            self.state = TaskState::Pending;
        }
    }

    pub fn run(&mut self, job: &Job, app: &App) -> Result<()> {
        if self.state != TaskState::Pending {
            return Err(Error::InvalidArgument(format!(
                "{self} is {:?}, not Pending",
                self.state
            )));
        }
        self.state = TaskState::Running;

        let res = match &self.kind {
            TaskKind::Map {
                index,
                input,
                n_reduce,
            } => do_map(job, *index, input, *n_reduce, |f, c| app.map(f, c)),
            TaskKind::Reduce { index, n_map } => {
                do_reduce(job, *index, *n_map, |k, vs| app.reduce(k, vs))
            }
        };

        match &res {
            Ok(()) => {
                self.state = TaskState::Completed;
                info!("{self} completed");
            }
            Err(e) => {
                self.state = TaskState::Failed;
                warn!("{self} failed: {e}");
            }
        }
        res
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            TaskKind::Map { index, input, .. } => {
                write!(f, "MapTask:{{ index: {index}, input: {} }}", input.display())
            }
            TaskKind::Reduce { index, .. } => write!(f, "ReduceTask:{{ index: {index} }}"),
        }
    }
}
