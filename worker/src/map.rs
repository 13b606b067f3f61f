use std::{fs, path::Path};

use common::{
    output::{stage_records, Staged},
    partition, Error, Job, KeyValue, Result,
};
use tracing::{debug, info, instrument};

/// Runs map task `map_task` over `in_file`.
///
/// `map_f` sees the whole file at once. Its records are split into
/// `n_reduce` buckets by key hash and every bucket, empty or not, is written
/// to the intermediate file for (`map_task`, bucket). Renaming starts only
/// after all buckets were written; a failure while renaming can still leave
/// some of them in place, and a failed task's files are unusable.
#[instrument(skip(job, map_f), fields(job = job.name()))]
pub fn do_map<F>(
    job: &Job,
    map_task: usize,
    in_file: &Path,
    n_reduce: usize,
    map_f: F,
) -> Result<()>
where
    F: Fn(&str, &str) -> Vec<KeyValue>,
{
    if n_reduce == 0 {
        return Err(Error::InvalidArgument("n_reduce must be at least 1".into()));
    }

    let contents = fs::read_to_string(in_file).map_err(|e| Error::input(in_file, e))?;
    let kvs = map_f(&in_file.to_string_lossy(), &contents);
    let total = kvs.len();

    let mut buckets: Vec<Vec<KeyValue>> = vec![Vec::new(); n_reduce];
    for kv in kvs {
        buckets[partition(&kv.key, n_reduce)].push(kv);
    }

    let staged = buckets
        .iter()
        .enumerate()
        .map(|(r, bucket)| {
            debug!(reduce_task = r, records = bucket.len(), "staging bucket");
            stage_records(&job.reduce_name(map_task, r), bucket)
        })
        .collect::<Result<Vec<Staged>>>()?;
    for s in staged {
        s.publish()?;
    }

    info!(records = total, "map task done");
    Ok(())
}
