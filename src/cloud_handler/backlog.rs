//! Durable per-kind backlogs of serialised records.
//!
//! A backlog is an append-only sequence of lines, one record per line.
//! [`FileBacklog`] keeps one UTF-8 file per [`RecordKind`] in a documents
//! directory; [`MemoryBacklog`] keeps the same shape in memory.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use tempfile::NamedTempFile;
use thiserror::Error;

use super::record::RecordKind;

/// File name of the log backlog inside the documents directory.
pub const DEFAULT_LOG_BACKLOG: &str = "cloud.log";
/// File name of the event backlog inside the documents directory.
pub const DEFAULT_EVENT_BACKLOG: &str = "events.log";

/// Storage failures raised by a backlog.
#[derive(Debug, Error)]
pub enum BacklogError {
    #[error("backlog I/O failed: {0}")]
    Io(#[from] io::Error),
    /// A record could not be turned into a backlog line.
    #[error("record cannot be stored as a backlog line: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for BacklogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// One stored backlog line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BacklogLine {
    Text(String),
    /// Bytes that are not UTF-8. Never a parseable record.
    Invalid(FromUtf8Error),
}

impl BacklogLine {
    fn from_bytes(raw: &[u8]) -> Self {
        match String::from_utf8(raw.to_vec()) {
            Ok(text) => Self::Text(text),
            Err(err) => Self::Invalid(err),
        }
    }

    /// The line's text, or the decoding error for an invalid line.
    pub fn as_text(&self) -> Result<&str, &FromUtf8Error> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Invalid(err) => Err(err),
        }
    }
}

impl From<String> for BacklogLine {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl PartialEq<&str> for BacklogLine {
    fn eq(&self, other: &&str) -> bool {
        self.as_text().is_ok_and(|text| text == *other)
    }
}

/// Append-only line store, one sequence per record kind.
///
/// Implementations are owned by a single forwarder and accessed under its
/// dispatch lock, so methods take `&mut self`.
pub trait BacklogStore: Send {
    /// Append `line` as the newest entry of `kind`'s backlog.
    ///
    /// `line` must not contain a newline.
    fn append(&mut self, kind: RecordKind, line: &str) -> Result<(), BacklogError>;

    /// Every line of `kind`'s backlog, oldest first.
    ///
    /// Lines are returned as stored, including blank, partial or non-UTF-8
    /// ones.
    fn read_all(&mut self, kind: RecordKind) -> Result<Vec<BacklogLine>, BacklogError>;

    /// Atomically replace `kind`'s backlog with an empty one.
    fn clear(&mut self, kind: RecordKind) -> Result<(), BacklogError>;
}

fn ensure_single_line(line: &str) -> Result<(), BacklogError> {
    if line.contains('\n') {
        return Err(BacklogError::Serialization(
            "backlog line contains a newline".into(),
        ));
    }
    Ok(())
}

/// Backlog stored as one file per kind.
#[derive(Debug)]
pub struct FileBacklog {
    dir: PathBuf,
    log_path: PathBuf,
    event_path: PathBuf,
}

impl FileBacklog {
    /// Open the backlog in `dir` with the default file names.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, BacklogError> {
        Self::open_with_names(dir, DEFAULT_LOG_BACKLOG, DEFAULT_EVENT_BACKLOG)
    }

    /// Open the backlog in `dir`, creating the directory and any missing
    /// backlog file (empty). Existing files are left untouched.
    pub fn open_with_names(
        dir: impl AsRef<Path>,
        log_name: &str,
        event_name: &str,
    ) -> Result<Self, BacklogError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let backlog = Self {
            log_path: dir.join(log_name),
            event_path: dir.join(event_name),
            dir,
        };
        for path in [&backlog.log_path, &backlog.event_path] {
            OpenOptions::new().create(true).append(true).open(path)?;
        }
        Ok(backlog)
    }

    pub fn path(&self, kind: RecordKind) -> &Path {
        match kind {
            RecordKind::Log => &self.log_path,
            RecordKind::Event => &self.event_path,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl BacklogStore for FileBacklog {
    fn append(&mut self, kind: RecordKind, line: &str) -> Result<(), BacklogError> {
        ensure_single_line(line)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(kind))?;
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');
        file.write_all(&buf)?;
        file.flush()?;
        Ok(())
    }

    fn read_all(&mut self, kind: RecordKind) -> Result<Vec<BacklogLine>, BacklogError> {
        let bytes = match fs::read(self.path(kind)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut lines: Vec<BacklogLine> = bytes
            .split(|b| *b == b'\n')
            .map(|raw| BacklogLine::from_bytes(raw.strip_suffix(b"\r").unwrap_or(raw)))
            .collect();
        // `split` yields an empty tail after the final newline.
        if bytes.ends_with(b"\n") || bytes.is_empty() {
            lines.pop();
        }
        Ok(lines)
    }

    fn clear(&mut self, kind: RecordKind) -> Result<(), BacklogError> {
        let empty = NamedTempFile::new_in(&self.dir)?;
        empty.as_file().sync_all()?;
        empty
            .persist(self.path(kind))
            .map_err(|err| BacklogError::Io(err.error))?;
        if let Err(err) = File::open(&self.dir).and_then(|dir| dir.sync_all()) {
            debug!("FileBacklog: failed to sync {}: {err}", self.dir.display());
        }
        Ok(())
    }
}

/// In-memory backlog. Clones share the same storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryBacklog {
    lines: Arc<Mutex<HashMap<RecordKind, Vec<String>>>>,
}

impl MemoryBacklog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of `kind`'s lines without going through the owning forwarder.
    pub fn lines(&self, kind: RecordKind) -> Vec<String> {
        self.lines.lock().get(&kind).cloned().unwrap_or_default()
    }

    /// Store `line` verbatim, bypassing validation. Used to seed corrupt
    /// entries.
    pub fn push_raw(&self, kind: RecordKind, line: impl Into<String>) {
        self.lines.lock().entry(kind).or_default().push(line.into());
    }
}

impl BacklogStore for MemoryBacklog {
    fn append(&mut self, kind: RecordKind, line: &str) -> Result<(), BacklogError> {
        ensure_single_line(line)?;
        self.push_raw(kind, line);
        Ok(())
    }

    fn read_all(&mut self, kind: RecordKind) -> Result<Vec<BacklogLine>, BacklogError> {
        Ok(self.lines(kind).into_iter().map(BacklogLine::Text).collect())
    }

    fn clear(&mut self, kind: RecordKind) -> Result<(), BacklogError> {
        self.lines.lock().remove(&kind);
        Ok(())
    }
}
