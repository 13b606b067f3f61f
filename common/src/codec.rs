//! Record stream codec: one JSON object per record, newline separated.
//!
//! A stream needs no length prefix or terminator, so it can be decoded one
//! record at a time. Decoding ends at EOF or at the first malformed record.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use serde_json::{de::IoRead, Deserializer, StreamDeserializer};
use tracing::warn;

use crate::{Error, KeyValue, Result};

pub struct RecordWriter<W: Write> {
    inner: BufWriter<W>,
    written: usize,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: BufWriter::new(inner),
            written: 0,
        }
    }

    pub fn write(&mut self, kv: &KeyValue) -> io::Result<()> {
        serde_json::to_writer(&mut self.inner, kv)?;
        self.inner.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn write_all<'a>(&mut self, kvs: impl IntoIterator<Item = &'a KeyValue>) -> io::Result<()> {
        kvs.into_iter().try_for_each(|kv| self.write(kv))
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes and hands back the underlying writer.
    pub fn finish(self) -> io::Result<W> {
        self.inner.into_inner().map_err(|e| e.into_error())
    }
}

/// Lazily decodes records from a stream.
///
/// A malformed record ends the stream (logged, not returned). An I/O error
/// also ends it, and is kept for [`RecordReader::finish`].
pub struct RecordReader<R: Read> {
    stream: StreamDeserializer<'static, IoRead<R>, KeyValue>,
    path: PathBuf,
    done: bool,
    truncated: bool,
    io_error: Option<io::Error>,
}

impl RecordReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::input(path, e))?;
        Ok(Self::new(BufReader::new(file), path))
    }
}

impl<R: Read> RecordReader<R> {
    /// `path` only labels log lines and errors.
    pub fn new(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            stream: Deserializer::from_reader(reader).into_iter(),
            path: path.into(),
            done: false,
            truncated: false,
            io_error: None,
        }
    }

    /// True if reading stopped at a malformed record rather than EOF.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Surfaces an I/O failure hit while reading.
    pub fn finish(self) -> Result<()> {
        match self.io_error {
            Some(e) => Err(Error::input(self.path, e)),
            None => Ok(()),
        }
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = KeyValue;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.stream.next() {
            Some(Ok(kv)) => Some(kv),
            Some(Err(e)) if e.is_io() => {
                self.done = true;
                self.io_error = Some(e.into());
                None
            }
            Some(Err(e)) => {
                self.done = true;
                self.truncated = true;
                let err = Error::MalformedRecord {
                    path: self.path.clone(),
                    source: e,
                };
                warn!("{err}, truncating");
                None
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Reads every record of `path`, stopping early at a malformed record.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<KeyValue>> {
    let mut reader = RecordReader::open(path)?;
    let records = reader.by_ref().collect();
    reader.finish()?;
    Ok(records)
}
