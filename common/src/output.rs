//! Publishing output files.
//!
//! Content goes to a uniquely named temporary sibling first and is renamed
//! onto the real name once complete, so a reader never sees a half-written
//! file under a task's name.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use tracing::debug;
use uuid::Uuid;

use crate::{codec::RecordWriter, Error, KeyValue, Result};

pub fn temp_file(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4()))
}

/// A fully written temporary file waiting to be renamed onto `target`.
/// Dropping it unpublished removes the temporary file.
#[derive(Debug)]
pub struct Staged {
    tmp: PathBuf,
    target: PathBuf,
    published: bool,
}

impl Staged {
    pub fn publish(mut self) -> Result<PathBuf> {
        fs::rename(&self.tmp, &self.target).map_err(|e| Error::output(&self.target, e))?;
        self.published = true;
        debug!("published {}", self.target.display());
        Ok(std::mem::take(&mut self.target))
    }
}

impl Drop for Staged {
    fn drop(&mut self) {
        if !self.published {
            let _ = fs::remove_file(&self.tmp);
        }
    }
}

/// Writes `records` to a temporary sibling of `target`.
pub fn stage_records<'a>(
    target: &Path,
    records: impl IntoIterator<Item = &'a KeyValue>,
) -> Result<Staged> {
    let staged = Staged {
        tmp: temp_file(target),
        target: target.to_path_buf(),
        published: false,
    };
    let file = File::create(&staged.tmp).map_err(|e| Error::output(target, e))?;
    let mut writer = RecordWriter::new(file);
    writer.write_all(records).map_err(|e| Error::output(target, e))?;
    debug!(records = writer.written(), "staged {}", target.display());
    writer
        .finish()
        .and_then(|file| file.sync_all())
        .map_err(|e| Error::output(target, e))?;
    Ok(staged)
}

/// Writes `records` to `target`, replacing any previous content.
pub fn write_records<'a>(
    target: &Path,
    records: impl IntoIterator<Item = &'a KeyValue>,
) -> Result<PathBuf> {
    stage_records(target, records)?.publish()
}
