//! A simple handler that accumulates records in memory for test assertions.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::handler::{FemtoHandlerTrait, HandlerError};
use crate::log_record::FemtoLogRecord;

/// Handler that stores every record it receives for later inspection.
///
/// Clones share the same storage, so a test can keep one clone and register
/// another with a logger.
#[derive(Clone, Default)]
pub struct CollectingHandler {
    records: Arc<Mutex<Vec<FemtoLogRecord>>>,
    fail: bool,
}

impl CollectingHandler {
    /// Create a new empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handler that stores records but reports every call as closed.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Return a snapshot of all records received so far.
    pub fn collected(&self) -> Vec<FemtoLogRecord> {
        self.records.lock().clone()
    }

    /// Return the messages received so far, in arrival order.
    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|r| r.message().to_owned())
            .collect()
    }
}

impl FemtoHandlerTrait for CollectingHandler {
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError> {
        self.records.lock().push(record);
        if self.fail {
            return Err(HandlerError::Closed);
        }
        Ok(())
    }
}
