//! File-based logging handler implemented with a producer-consumer model.
//!
//! A background thread owns the append-mode file handle and receives
//! commands over a bounded channel. Messages are written verbatim, one per
//! line; a message that already ends in a newline is not given a second one.
//! Reading and truncating go through the same worker so they observe every
//! record queued before them.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
    sync::atomic::{AtomicU8, Ordering},
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Sender, TrySendError, bounded};
use log::warn;
use parking_lot::Mutex;

use crate::{
    handler::{FemtoHandlerTrait, HandlerError},
    level::FemtoLevel,
    log_record::FemtoLogRecord,
    rate_limited_warner::RateLimitedWarner,
};

/// File name used by [`FemtoFileHandler::in_dir`].
pub const DEFAULT_LOG_FILE_NAME: &str = "femtorelay.log";
/// Records below this level are ignored unless configured otherwise.
pub const DEFAULT_FILE_MIN_LEVEL: FemtoLevel = FemtoLevel::Warning;
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

enum FileCommand {
    Record(FemtoLogRecord),
    Flush(Sender<()>),
    Truncate(Sender<io::Result<()>>),
}

/// Handler that appends messages to a local file on a background thread.
pub struct FemtoFileHandler {
    path: PathBuf,
    min_level: AtomicU8,
    tx: Option<Sender<FileCommand>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    warner: RateLimitedWarner,
    flush_timeout: Duration,
}

impl FemtoFileHandler {
    /// Append to `path`, creating it if absent.
    pub fn new<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Self::with_capacity(path, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Append to [`DEFAULT_LOG_FILE_NAME`] inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Self::new(dir.as_ref().join(DEFAULT_LOG_FILE_NAME))
    }

    /// Create a new handler with a bounded queue of `capacity` records.
    ///
    /// When the queue is full, new records are dropped.
    pub fn with_capacity<P: AsRef<Path>>(path: P, capacity: usize) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let (tx, rx) = bounded(capacity);
        let handle = thread::Builder::new()
            .name("femtorelay-file".into())
            .spawn(move || {
                let mut file = file;
                for command in rx {
                    match command {
                        FileCommand::Record(record) => {
                            if append_message(&mut file, record.message()).is_err() {
                                warn!("FemtoFileHandler write error");
                            }
                        }
                        FileCommand::Flush(ack) => {
                            let _ = file.flush();
                            let _ = ack.send(());
                        }
                        FileCommand::Truncate(ack) => {
                            let _ = ack.send(file.set_len(0));
                        }
                    }
                }
            })?;

        Ok(Self {
            path,
            min_level: AtomicU8::new(u8::from(DEFAULT_FILE_MIN_LEVEL)),
            tx: Some(tx),
            handle: Mutex::new(Some(handle)),
            warner: RateLimitedWarner::default(),
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        })
    }

    /// Builder-style variant of [`set_min_level`](Self::set_min_level).
    pub fn with_min_level(self, level: FemtoLevel) -> Self {
        self.set_min_level(level);
        self
    }

    pub fn set_min_level(&self, level: FemtoLevel) {
        self.min_level.store(u8::from(level), Ordering::Relaxed);
    }

    pub fn min_level(&self) -> FemtoLevel {
        FemtoLevel::try_from(self.min_level.load(Ordering::Relaxed))
            .unwrap_or(DEFAULT_FILE_MIN_LEVEL)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return every line written so far, after draining the queue.
    pub fn contents(&self) -> io::Result<Vec<String>> {
        self.flush();
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        BufReader::new(file).lines().collect()
    }

    /// Erase the file once queued records have been written.
    pub fn truncate(&self) -> io::Result<()> {
        let tx = self.tx.as_ref().ok_or_else(closed_error)?;
        let (ack_tx, ack_rx) = bounded(1);
        tx.send_timeout(FileCommand::Truncate(ack_tx), self.flush_timeout)
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "file worker busy"))?;
        ack_rx
            .recv_timeout(self.flush_timeout)
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "file worker did not respond"))?
    }

    /// Stop the worker after it has written every queued record.
    pub fn close(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.lock().take()
            && handle.join().is_err()
        {
            warn!("FemtoFileHandler: worker thread panicked");
        }
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "file handler is closed")
}

fn append_message<W: Write>(writer: &mut W, message: &str) -> io::Result<()> {
    if message.ends_with('\n') {
        writer.write_all(message.as_bytes())?;
    } else {
        let mut line = String::with_capacity(message.len() + 1);
        line.push_str(message);
        line.push('\n');
        writer.write_all(line.as_bytes())?;
    }
    writer.flush()
}

impl FemtoHandlerTrait for FemtoFileHandler {
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError> {
        if record.level() < self.min_level() {
            return Ok(());
        }
        let Some(tx) = self.tx.as_ref() else {
            return Err(HandlerError::Closed);
        };
        match tx.try_send(FileCommand::Record(record)) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.warner.record_drop();
                self.warner.warn_if_due(|count| {
                    warn!("FemtoFileHandler: queue full or shutting down, dropped {count} records");
                });
                Err(match err {
                    TrySendError::Full(_) => HandlerError::QueueFull,
                    TrySendError::Disconnected(_) => HandlerError::Closed,
                })
            }
        }
    }

    fn flush(&self) -> bool {
        let Some(tx) = self.tx.as_ref() else {
            return false;
        };
        let (ack_tx, ack_rx) = bounded(1);
        tx.send_timeout(FileCommand::Flush(ack_tx), self.flush_timeout)
            .is_ok()
            && ack_rx.recv_timeout(self.flush_timeout).is_ok()
    }
}

impl Drop for FemtoFileHandler {
    fn drop(&mut self) {
        self.close();
    }
}
