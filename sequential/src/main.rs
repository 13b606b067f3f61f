use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use common::Job;
use worker::{apps, init_logger, run_job, JobOptions};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(short, long)]
    app_name: String,
    #[arg(short, long, default_value = "seq")]
    job: String,
    #[arg(short, long, default_value_t = 10)]
    n_reduce: usize,
    /// Directory for intermediate and output files.
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,
    /// Tasks of one phase run at once; 0 means one per CPU.
    #[arg(short, long, default_value_t = 0)]
    parallelism: usize,
    /// Remove intermediate files after merging.
    #[arg(long)]
    cleanup: bool,
    #[arg(required = true)]
    input_files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = init_logger();
    let cli = Cli::parse();
    let app = apps::load(&cli.app_name)?;

    let job = Job::with_dir(&cli.job, &cli.dir);
    let mut options = JobOptions {
        cleanup: cli.cleanup,
        ..Default::default()
    };
    if cli.parallelism > 0 {
        options.parallelism = cli.parallelism;
    }

    let out = run_job(&job, &cli.input_files, cli.n_reduce, &app, &options).await?;
    println!("{}", out.display());
    Ok(())
}
