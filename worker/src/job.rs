//! Runs a whole job on this machine: every map task, then every reduce
//! task, then the final merge.

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use common::{App, Job};
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::info;

use crate::{
    merge::{cleanup_intermediate, merge},
    task::Task,
};

#[derive(Debug, Clone)]
pub struct JobOptions {
    /// Upper bound on tasks running at once within a phase.
    pub parallelism: usize,
    /// Remove intermediate and per-reduce files once the result is merged.
    pub cleanup: bool,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            parallelism: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            cleanup: false,
        }
    }
}

pub async fn run_job(
    job: &Job,
    inputs: &[PathBuf],
    n_reduce: usize,
    app: &App,
    options: &JobOptions,
) -> Result<PathBuf> {
    if inputs.is_empty() {
        bail!("job {} has no input files", job.name());
    }
    if n_reduce == 0 {
        bail!("job {} needs at least one reduce task", job.name());
    }
    let n_map = inputs.len();
    info!(
        job = job.name(),
        n_map,
        n_reduce,
        app = %app.app_name,
        "starting job"
    );

    let maps = inputs
        .iter()
        .enumerate()
        .map(|(i, input)| Task::map(i, input, n_reduce))
        .collect();
    run_phase(job, app, maps, options.parallelism)
        .await
        .context("map phase")?;
    info!("map done, start reduce");

    let reduces = (0..n_reduce).map(|r| Task::reduce(r, n_map)).collect();
    run_phase(job, app, reduces, options.parallelism)
        .await
        .context("reduce phase")?;

    let merge_job = job.clone();
    let out = tokio::task::spawn_blocking(move || merge(&merge_job, n_reduce))
        .await?
        .context("merge")?;

    if options.cleanup {
        cleanup_intermediate(job, n_map, n_reduce);
    }
    info!("all done: {}", out.display());
    Ok(out)
}

/// Runs `tasks` on the blocking pool and waits for all of them, even after
/// one has failed, so nothing is still writing once this returns.
async fn run_phase(job: &Job, app: &App, tasks: Vec<Task>, parallelism: usize) -> Result<()> {
    let permits = Arc::new(Semaphore::new(parallelism.max(1)));
    let running = tasks.into_iter().map(|mut task| {
        let job = job.clone();
        let app = app.clone();
        let permits = Arc::clone(&permits);
        async move {
            let _permit = permits.acquire_owned().await?;
            let name = task.to_string();
            tokio::task::spawn_blocking(move || task.run(&job, &app))
                .await?
                .with_context(|| format!("{name} failed"))
        }
    });
    let results: Vec<Result<()>> = join_all(running).await;
    results.into_iter().collect()
}
