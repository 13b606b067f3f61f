use common::{codec::RecordReader, output::write_records, Error, Job, KeyValue, Result};
use itertools::Itertools;
use tracing::{info, instrument};

/// Runs reduce task `reduce_task` over the output of all `n_map` map tasks.
///
/// Intermediate files are read one at a time, each closed before the next
/// is opened. The output file is only written once every input was read, so
/// a missing one fails the task without creating it. Records are stably
/// sorted by key, so the values handed to `reduce_f` keep the order they
/// were read in (map task 0 first).
#[instrument(skip(job, reduce_f), fields(job = job.name()))]
pub fn do_reduce<F>(job: &Job, reduce_task: usize, n_map: usize, reduce_f: F) -> Result<()>
where
    F: Fn(&str, Vec<String>) -> String,
{
    if n_map == 0 {
        return Err(Error::InvalidArgument("n_map must be at least 1".into()));
    }

    let mut records = Vec::new();
    let mut truncated = 0;
    for m in 0..n_map {
        let mut reader = RecordReader::open(job.reduce_name(m, reduce_task))?;
        records.extend(reader.by_ref());
        if reader.truncated() {
            truncated += 1;
        }
        reader.finish()?;
    }
    let total = records.len();

    let results = group_and_reduce(records, reduce_f);

    write_records(&job.merge_name(reduce_task), &results)?;
    info!(
        records = total,
        keys = results.len(),
        truncated,
        "reduce task done"
    );
    Ok(())
}

/// Sorts `records` by key and folds each run of equal keys into one record.
pub fn group_and_reduce<F>(mut records: Vec<KeyValue>, reduce_f: F) -> Vec<KeyValue>
where
    F: Fn(&str, Vec<String>) -> String,
{
    records.sort_by(|a, b| a.key.cmp(&b.key));

    let mut results = Vec::new();
    for (key, group) in records
        .into_iter()
        .group_by(|kv| kv.key.clone())
        .into_iter()
    {
        let values = group.map(|kv| kv.value).collect_vec();
        let reduced = reduce_f(&key, values);
        results.push(KeyValue { key, value: reduced });
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{codec::read_records, output::write_records};
    use std::{cell::RefCell, collections::HashMap, fs};

    fn count(_key: &str, values: Vec<String>) -> String {
        values.len().to_string()
    }

    fn write_shard(job: &Job, m: usize, r: usize, kvs: &[KeyValue]) {
        write_records(&job.reduce_name(m, r), kvs).unwrap();
    }

    #[test]
    fn test_reduce_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let job = Job::with_dir("job1", dir.path());
        write_shard(&job, 0, 0, &[KeyValue::new("the", "1"), KeyValue::new("fox", "1")]);
        write_shard(&job, 1, 0, &[KeyValue::new("the", "1"), KeyValue::new("quick", "1")]);

        do_reduce(&job, 0, 2, count).unwrap();

        assert_eq!(
            read_records(job.merge_name(0)).unwrap(),
            vec![
                KeyValue::new("fox", "1"),
                KeyValue::new("quick", "1"),
                KeyValue::new("the", "2"),
            ]
        );
    }

    #[test]
    fn test_reduce_missing_shard() {
        let dir = tempfile::tempdir().unwrap();
        let job = Job::with_dir("job1", dir.path());
        write_shard(&job, 0, 0, &[KeyValue::new("a", "1")]);
        write_shard(&job, 1, 0, &[KeyValue::new("b", "1")]);

        let err = do_reduce(&job, 0, 3, count).unwrap_err();
        assert!(matches!(err, Error::InputUnreadable { .. }));
        assert!(!job.merge_name(0).exists());
    }

    #[test]
    fn test_reduce_groups_every_value_once() {
        let dir = tempfile::tempdir().unwrap();
        let job = Job::with_dir("group", dir.path());
        write_shard(&job, 0, 2, &[KeyValue::new("k", "m0-a"), KeyValue::new("j", "m0-b")]);
        write_shard(&job, 1, 2, &[]);
        write_shard(&job, 2, 2, &[KeyValue::new("k", "m2-a"), KeyValue::new("k", "m2-b")]);

        let calls = RefCell::new(HashMap::new());
        do_reduce(&job, 2, 3, |key: &str, values: Vec<String>| {
            let prev = calls.borrow_mut().insert(key.to_string(), values.clone());
            assert!(prev.is_none(), "reduce called twice for {key}");
            values.join(" ")
        })
        .unwrap();

        let calls = calls.into_inner();
        assert_eq!(calls.len(), 2);
        // stable sort: values keep map-task order, then file order
        assert_eq!(calls["k"], ["m0-a", "m2-a", "m2-b"]);
        assert_eq!(calls["j"], ["m0-b"]);
    }

    #[test]
    fn test_reduce_output_keys_strictly_increasing() {
        let dir = tempfile::tempdir().unwrap();
        let job = Job::with_dir("order", dir.path());
        let keys = ["b", "B", "a", "ab", "", "é", "a", "b", "Z"];
        for (m, chunk) in keys.chunks(3).enumerate() {
            let kvs: Vec<_> = chunk.iter().map(|k| KeyValue::new(*k, "1")).collect();
            write_shard(&job, m, 0, &kvs);
        }

        do_reduce(&job, 0, 3, count).unwrap();

        let out = read_records(job.merge_name(0)).unwrap();
        assert!(out.windows(2).all(|w| w[0].key.as_bytes() < w[1].key.as_bytes()));
        assert_eq!(out.len(), 7);
    }

    #[test]
    fn test_reduce_keeps_records_before_malformed_tail() {
        let dir = tempfile::tempdir().unwrap();
        let job = Job::with_dir("trunc", dir.path());
        write_shard(&job, 0, 0, &[KeyValue::new("x", "1")]);
        let mut bytes = fs::read(job.reduce_name(0, 0)).unwrap();
        bytes.extend_from_slice(b"{\"Key\": 12\n");
        bytes.extend_from_slice(b"{\"Key\":\"lost\",\"Value\":\"1\"}\n");
        fs::write(job.reduce_name(0, 0), bytes).unwrap();
        write_shard(&job, 1, 0, &[KeyValue::new("x", "1"), KeyValue::new("y", "1")]);

        do_reduce(&job, 0, 2, count).unwrap();

        assert_eq!(
            read_records(job.merge_name(0)).unwrap(),
            vec![KeyValue::new("x", "2"), KeyValue::new("y", "1")]
        );
    }

    #[test]
    fn test_reduce_many_shards_one_open_file_at_a_time() {
        let dir = tempfile::tempdir().unwrap();
        let job = Job::with_dir("many", dir.path());
        // above the usual 1024 descriptor soft limit
        let n_map = 2000;
        for m in 0..n_map {
            write_shard(&job, m, 0, &[KeyValue::new("k", m.to_string())]);
        }

        do_reduce(&job, 0, n_map, count).unwrap();

        assert_eq!(
            read_records(job.merge_name(0)).unwrap(),
            vec![KeyValue::new("k", n_map.to_string())]
        );
    }

    #[test]
    fn test_reduce_io_error_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let job = Job::with_dir("isdir", dir.path());
        fs::create_dir(job.reduce_name(0, 0)).unwrap();
        write_shard(&job, 1, 0, &[KeyValue::new("a", "1")]);

        let err = do_reduce(&job, 0, 2, count).unwrap_err();
        assert!(
            matches!(err, Error::InputUnreadable { ref path, .. } if *path == job.reduce_name(0, 0))
        );
        assert!(!job.merge_name(0).exists());
    }

    #[test]
    fn test_reduce_all_empty_shards() {
        let dir = tempfile::tempdir().unwrap();
        let job = Job::with_dir("none", dir.path());
        write_shard(&job, 0, 1, &[]);

        do_reduce(&job, 1, 1, count).unwrap();
        assert_eq!(fs::read(job.merge_name(1)).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_reduce_rejects_zero_maps() {
        let dir = tempfile::tempdir().unwrap();
        let job = Job::with_dir("zero", dir.path());
        let err = do_reduce(&job, 0, 0, count).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_group_and_reduce_in_memory() {
        let records = vec![
            KeyValue::new("b", "1"),
            KeyValue::new("a", "2"),
            KeyValue::new("b", "3"),
        ];
        let out = group_and_reduce(records, |_key: &str, values: Vec<String>| values.concat());
        assert_eq!(out, vec![KeyValue::new("a", "2"), KeyValue::new("b", "13")]);
    }
}
