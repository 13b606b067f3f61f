use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use common::{codec::read_records, output::temp_file, Error, Job, Result};
use tracing::{debug, info, warn};

/// Combines the output of all `n_reduce` reduce tasks into the job's final
/// file, one `key: value` line per key in key order.
pub fn merge(job: &Job, n_reduce: usize) -> Result<PathBuf> {
    let mut kvs = BTreeMap::new();
    for r in 0..n_reduce {
        let path = job.merge_name(r);
        debug!("merge: read {}", path.display());
        for kv in read_records(&path)? {
            kvs.insert(kv.key, kv.value);
        }
    }

    let target = job.ans_name();
    let tmp = temp_file(&target);
    let write = || -> io::Result<()> {
        let mut w = BufWriter::new(File::create(&tmp)?);
        for (k, v) in &kvs {
            writeln!(w, "{k}: {v}")?;
        }
        w.flush()?;
        fs::rename(&tmp, &target)
    };
    if let Err(e) = write() {
        let _ = fs::remove_file(&tmp);
        return Err(Error::output(&target, e));
    }

    info!(keys = kvs.len(), "merged into {}", target.display());
    Ok(target)
}

fn remove_file(path: PathBuf) {
    match fs::remove_file(&path) {
        Ok(()) => debug!("removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("cannot remove {}: {e}", path.display()),
    }
}

/// Removes the intermediate and per-reduce output files of a job.
pub fn cleanup_intermediate(job: &Job, n_map: usize, n_reduce: usize) {
    for r in 0..n_reduce {
        for m in 0..n_map {
            remove_file(job.reduce_name(m, r));
        }
        remove_file(job.merge_name(r));
    }
}

/// Removes every file of a job, including the final result.
pub fn cleanup_files(job: &Job, n_map: usize, n_reduce: usize) {
    cleanup_intermediate(job, n_map, n_reduce);
    remove_file(job.ans_name());
}
