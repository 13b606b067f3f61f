use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::Job;
use tracing::info;
use worker::{apps, init_logger, Task};

/// Executes exactly one map or reduce task of a job.
#[derive(Parser, Debug)]
struct Cli {
    /// Name of the job; all file names derive from it.
    #[arg(short, long)]
    job: String,
    #[arg(short, long, default_value = "wc")]
    app: String,
    /// Directory holding the job's files.
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,
    #[command(subcommand)]
    task: TaskCmd,
}

#[derive(Subcommand, Debug)]
enum TaskCmd {
    /// Map one input file into per-reduce intermediate files.
    Map {
        #[arg(short, long)]
        task: usize,
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long, default_value_t = 10)]
        n_reduce: usize,
    },
    /// Reduce the intermediate files of one shard.
    Reduce {
        #[arg(short, long)]
        task: usize,
        #[arg(short = 'm', long)]
        n_map: usize,
    },
}

fn main() -> Result<()> {
    let _guard = init_logger();
    let cli = Cli::parse();

    let app = apps::load(&cli.app)?;
    let job = Job::with_dir(&cli.job, &cli.dir);
    let mut task = match cli.task {
        TaskCmd::Map {
            task,
            input,
            n_reduce,
        } => Task::map(task, input, n_reduce),
        TaskCmd::Reduce { task, n_map } => Task::reduce(task, n_map),
    };

    info!("worker run {} of job {}", task, job.name());
    task.run(&job, &app)
        .with_context(|| format!("{task} of job {}", job.name()))
}
