//! Public handler type exported by the crate.

use std::{
    error::Error,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::Duration,
};

use crossbeam_channel::Sender;
use parking_lot::Mutex;

use crate::{
    handler::{FemtoHandlerTrait, HandlerError},
    level::FemtoLevel,
    log_record::FemtoLogRecord,
    rate_limited_warner::RateLimitedWarner,
};

use super::{
    config::{CloudHandlerConfig, OverflowPolicy},
    forwarder::OfflineForwarder,
    record::{CloudEvent, CloudLog, Measurements},
    worker::{CloudCommand, enqueue, flush_queue, spawn_worker},
};

/// Locations of the file-backed backlogs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacklogPaths {
    pub log: PathBuf,
    pub event: PathBuf,
}

/// Store-and-forward handler shipping logs, exceptions and events to the
/// cloud.
///
/// `submit_*` calls only enqueue. A worker thread runs each record through
/// an [`OfflineForwarder`], which transmits it (after replaying the
/// backlog) when the endpoint is reachable and persists it otherwise.
/// Failures never reach the submitter. Per-record failures are logged at
/// debug level; aggregated drop counts are rate-limited warnings.
///
/// A record is lost without being persisted when:
///
/// * the backlog cannot be written or cleared;
/// * replaying the backlog fails (the backlog is kept, the new record is not);
/// * a backlog line is corrupt, and that line is discarded;
/// * the record itself fails to transmit while online;
/// * the submit queue is full under [`OverflowPolicy::Drop`] (the default) or
///   stays full past an [`OverflowPolicy::Timeout`], or the handler is closed.
///   Such a record never reaches the forwarder. [`OverflowPolicy::Block`]
///   waits for room instead.
pub struct FemtoCloudHandler {
    tx: Option<Sender<CloudCommand>>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
    forwarder: Arc<OfflineForwarder>,
    min_level: FemtoLevel,
    overflow_policy: OverflowPolicy,
    flush_timeout: Duration,
    warner: RateLimitedWarner,
    backlog_paths: Option<BacklogPaths>,
}

impl FemtoCloudHandler {
    /// Start the worker for `forwarder`.
    ///
    /// `config.min_level` is trusted here; `CloudHandlerBuilder` enforces the
    /// severity floor.
    pub(crate) fn with_config(
        config: CloudHandlerConfig,
        forwarder: OfflineForwarder,
        backlog_paths: Option<BacklogPaths>,
    ) -> std::io::Result<Self> {
        let forwarder = Arc::new(forwarder);
        let (tx, handle) = spawn_worker(Arc::clone(&forwarder), config.capacity)?;
        Ok(Self {
            tx: Some(tx),
            handle: Mutex::new(Some(handle)),
            forwarder,
            min_level: config.min_level,
            overflow_policy: config.overflow_policy,
            flush_timeout: config.flush_timeout,
            warner: RateLimitedWarner::new(config.warn_interval),
            backlog_paths,
        })
    }

    /// Queue a log entry. Entries below [`min_level`](Self::min_level) are
    /// discarded.
    pub fn submit_log(&self, level: FemtoLevel, message: &str) {
        let _ = self.try_submit_log(level, message);
    }

    /// Queue an Error entry describing `err` and its sources.
    pub fn submit_exception(&self, err: &dyn Error) {
        let _ = self.submit(CloudCommand::Log(CloudLog::from_error(err)));
    }

    /// Queue a structured event.
    pub fn submit_event(&self, event_id: i32, description: &str, measurements: Measurements) {
        let _ = self.submit(CloudCommand::Event(CloudEvent::new(
            event_id,
            description,
            measurements,
        )));
    }

    fn try_submit_log(&self, level: FemtoLevel, message: &str) -> Result<(), HandlerError> {
        if level < self.min_level {
            return Ok(());
        }
        self.submit(CloudCommand::Log(CloudLog::new(level, message)))
    }

    fn submit(&self, command: CloudCommand) -> Result<(), HandlerError> {
        let Some(tx) = self.tx.as_ref() else {
            self.warner.record_drop();
            self.warner.warn_if_due(|count| {
                log::warn!("FemtoCloudHandler dropped {count} records after shutdown");
            });
            return Err(HandlerError::Closed);
        };
        enqueue(tx, command, self.overflow_policy, &self.warner)
    }

    pub fn min_level(&self) -> FemtoLevel {
        self.min_level
    }

    /// Backlog file locations, or `None` for an in-memory backlog.
    pub fn backlog_paths(&self) -> Option<&BacklogPaths> {
        self.backlog_paths.as_ref()
    }

    pub fn log_backlog_path(&self) -> Option<&Path> {
        self.backlog_paths.as_ref().map(|paths| paths.log.as_path())
    }

    pub fn event_backlog_path(&self) -> Option<&Path> {
        self.backlog_paths.as_ref().map(|paths| paths.event.as_path())
    }

    /// The synchronous core shared with the worker.
    pub fn forwarder(&self) -> &Arc<OfflineForwarder> {
        &self.forwarder
    }

    /// Wait until every record queued before this call has been dispatched.
    pub fn flush(&self) -> bool {
        <Self as FemtoHandlerTrait>::flush(self)
    }

    /// Dispatch everything still queued, then stop the worker.
    ///
    /// Waits at most the flush timeout for the worker to acknowledge; a
    /// worker that misses the deadline is detached rather than joined.
    pub fn close(&mut self) {
        let stopping = self.request_shutdown();
        self.join_worker(stopping);
    }

    /// Returns `true` once the worker has acknowledged the shutdown.
    fn request_shutdown(&mut self) -> bool {
        let Some(tx) = self.tx.take() else {
            return false;
        };
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        if tx
            .send_timeout(CloudCommand::Shutdown(ack_tx), self.flush_timeout)
            .is_err()
        {
            log::warn!("FemtoCloudHandler: worker did not accept shutdown");
            return false;
        }
        let acked = ack_rx.recv_timeout(self.flush_timeout).is_ok();
        if !acked {
            log::warn!("FemtoCloudHandler: timed out waiting for worker shutdown");
        }
        acked
    }

    fn join_worker(&mut self, stopping: bool) {
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        if !stopping && !handle.is_finished() {
            return;
        }
        if handle.join().is_err() {
            log::warn!("FemtoCloudHandler: worker thread panicked");
        }
    }
}

impl FemtoHandlerTrait for FemtoCloudHandler {
    /// Forward a front-end record as a cloud log entry. The message group is
    /// not shipped.
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError> {
        self.try_submit_log(record.level(), record.message())
    }

    fn flush(&self) -> bool {
        let Some(tx) = self.tx.as_ref() else {
            return false;
        };
        self.warner.flush(|count| {
            log::warn!("FemtoCloudHandler dropped {count} records in the last interval");
        });
        flush_queue(tx, self.flush_timeout)
    }
}

impl Drop for FemtoCloudHandler {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for FemtoCloudHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FemtoCloudHandler")
            .field("min_level", &self.min_level)
            .field("overflow_policy", &self.overflow_policy)
            .field("flush_timeout", &self.flush_timeout)
            .field("backlog_paths", &self.backlog_paths)
            .finish()
    }
}
