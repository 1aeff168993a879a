//! Stream-based logging handler implementation.
//!
//! This module defines `FemtoStreamHandler`, which formats log records and
//! writes them to a stream on a background thread. The handler forwards
//! `FemtoLogRecord` values over a bounded channel so the producer never blocks
//! on I/O.

use std::{
    io::{self, Write},
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Sender, TrySendError, bounded};
use log::warn;
use parking_lot::Mutex;

use crate::{
    formatter::{ConsoleFormatter, FemtoFormatter},
    handler::{FemtoHandlerTrait, HandlerError},
    log_record::FemtoLogRecord,
    rate_limited_warner::RateLimitedWarner,
};

/// Default bounded channel capacity for stream handlers.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
/// Default upper bound on `flush`.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

enum StreamCommand {
    Record(FemtoLogRecord),
    Flush(Sender<()>),
}

/// Handler that writes formatted log records to an `io::Write` stream.
///
/// Each instance owns a background thread which receives records via a
/// channel and writes them to the provided stream. The writer and formatter
/// are moved into that thread so the caller never locks or blocks.
pub struct FemtoStreamHandler {
    tx: Option<Sender<StreamCommand>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    warner: RateLimitedWarner,
    flush_timeout: Duration,
}

impl FemtoStreamHandler {
    /// Create a new handler writing bare messages to `stdout`.
    pub fn stdout() -> io::Result<Self> {
        Self::new(io::stdout(), ConsoleFormatter::default())
    }

    /// Create a new handler writing bare messages to `stderr`.
    pub fn stderr() -> io::Result<Self> {
        Self::new(io::stderr(), ConsoleFormatter::default())
    }

    /// Create a new handler from an arbitrary writer and formatter using the default capacity.
    pub fn new<W, F>(writer: W, formatter: F) -> io::Result<Self>
    where
        W: Write + Send + 'static,
        F: FemtoFormatter + 'static,
    {
        Self::with_capacity(writer, formatter, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new handler with a custom channel capacity.
    pub fn with_capacity<W, F>(writer: W, formatter: F, capacity: usize) -> io::Result<Self>
    where
        W: Write + Send + 'static,
        F: FemtoFormatter + 'static,
    {
        let (tx, rx) = bounded(capacity);
        let handle = thread::Builder::new()
            .name("femtorelay-stream".into())
            .spawn(move || {
                let mut writer = writer;
                for command in rx {
                    match command {
                        StreamCommand::Record(record) => {
                            let msg = formatter.format(&record);
                            if writeln!(writer, "{msg}")
                                .and_then(|_| writer.flush())
                                .is_err()
                            {
                                warn!("FemtoStreamHandler write error");
                            }
                        }
                        StreamCommand::Flush(ack) => {
                            let _ = writer.flush();
                            let _ = ack.send(());
                        }
                    }
                }
            })?;

        Ok(Self {
            tx: Some(tx),
            handle: Mutex::new(Some(handle)),
            warner: RateLimitedWarner::default(),
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        })
    }

    /// Stop accepting records and wait for the worker to write what is queued.
    pub fn close(&mut self) {
        // Dropping the sender ends the worker loop once the queue is empty.
        self.tx.take();
        if let Some(handle) = self.handle.lock().take()
            && handle.join().is_err()
        {
            warn!("FemtoStreamHandler: worker thread panicked");
        }
    }
}

impl FemtoHandlerTrait for FemtoStreamHandler {
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError> {
        let Some(tx) = self.tx.as_ref() else {
            return Err(HandlerError::Closed);
        };
        match tx.try_send(StreamCommand::Record(record)) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.warner.record_drop();
                self.warner.warn_if_due(|count| {
                    warn!(
                        "FemtoStreamHandler: queue full or shutting down, dropped {count} records"
                    );
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
        tx.send_timeout(StreamCommand::Flush(ack_tx), self.flush_timeout)
            .is_ok()
            && ack_rx.recv_timeout(self.flush_timeout).is_ok()
    }
}

impl Drop for FemtoStreamHandler {
    fn drop(&mut self) {
        self.close();
    }
}
