use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::time::LocalTime, EnvFilter};

pub mod apps;
pub mod job;
pub mod map;
pub mod merge;
pub mod reduce;
pub mod task;

pub use job::{run_job, JobOptions};
pub use map::do_map;
pub use merge::{cleanup_files, merge};
pub use reduce::do_reduce;
pub use task::{Task, TaskKind, TaskState};

/// Installs the global subscriber: `RUST_LOG` filter (default `info`),
/// local timestamps, stderr through a non-blocking writer.
///
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init_logger() -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_timer(timer)
        .with_writer(writer)
        .with_target(false)
        .init();
    guard
}
