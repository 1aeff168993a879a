//! Handler trait implemented by every log sink.

use std::io;

use thiserror::Error;

use crate::log_record::FemtoLogRecord;

/// Errors a handler may report while accepting a record.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler's queue is at capacity and the record was dropped.
    #[error("handler queue is full")]
    QueueFull,
    /// The handler has been closed and no longer accepts records.
    #[error("handler is closed")]
    Closed,
    /// Writing the record failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Trait implemented by all log handlers.
///
/// Handlers are `Send + Sync` so one instance can be registered with a
/// logger that is shared between threads. Implementations that perform
/// slow I/O forward the record to their own worker thread instead of
/// blocking the caller.
pub trait FemtoHandlerTrait: Send + Sync {
    /// Dispatch a log record for handling.
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError>;

    /// Flush pending output. Returns `true` when the flush completed.
    fn flush(&self) -> bool {
        true
    }
}
