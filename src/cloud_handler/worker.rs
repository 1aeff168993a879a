//! Worker thread performing cloud dispatches.
//!
//! Submitters only enqueue; the single consumer runs every dispatch through
//! the shared [`OfflineForwarder`], so backlog I/O and network sends never
//! happen on a caller's thread.

use std::{
    io,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{
    Receiver, SendTimeoutError, Sender, TryRecvError, TrySendError, bounded,
};
use log::{debug, warn};

use crate::{handler::HandlerError, rate_limited_warner::RateLimitedWarner};

use super::{
    config::OverflowPolicy,
    forwarder::{DispatchOutcome, OfflineForwarder},
    record::{CloudEvent, CloudLog, CloudRecord},
};

/// Commands processed by the worker thread.
#[derive(Debug)]
pub enum CloudCommand {
    Log(CloudLog),
    Event(CloudEvent),
    Flush(Sender<()>),
    Shutdown(Sender<()>),
}

/// Spawn the dispatch worker.
///
/// Returns the command sender and the worker's join handle.
pub fn spawn_worker(
    forwarder: Arc<OfflineForwarder>,
    capacity: usize,
) -> io::Result<(Sender<CloudCommand>, thread::JoinHandle<()>)> {
    let (tx, rx) = bounded(capacity);
    let handle = thread::Builder::new()
        .name("femtorelay-cloud".into())
        .spawn(move || Worker { forwarder }.run(rx))?;
    Ok((tx, handle))
}

struct Worker {
    forwarder: Arc<OfflineForwarder>,
}

impl Worker {
    fn dispatch<R: CloudRecord>(&self, record: &R) {
        match self.forwarder.dispatch(record) {
            DispatchOutcome::Dropped(reason) => {
                debug!("FemtoCloudHandler: {} record dropped ({reason:?})", R::KIND);
            }
            outcome => debug!("FemtoCloudHandler: {} record {outcome:?}", R::KIND),
        }
    }

    fn handle(&self, command: CloudCommand) {
        match command {
            CloudCommand::Log(log) => self.dispatch(&log),
            CloudCommand::Event(event) => self.dispatch(&event),
            // Shutdowns seen while draining are only acknowledged.
            CloudCommand::Flush(ack) | CloudCommand::Shutdown(ack) => {
                let _ = ack.send(());
            }
        }
    }

    fn drain_pending(&self, rx: &Receiver<CloudCommand>) {
        loop {
            match rx.try_recv() {
                Ok(command) => self.handle(command),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn run(self, rx: Receiver<CloudCommand>) {
        loop {
            match rx.recv() {
                Ok(CloudCommand::Shutdown(ack)) => {
                    self.drain_pending(&rx);
                    let _ = ack.send(());
                    break;
                }
                Ok(command) => self.handle(command),
                Err(_) => break,
            }
        }
    }
}

/// Hand `command` to the worker according to `policy`.
///
/// # Errors
///
/// * [`HandlerError::QueueFull`] - the queue stayed full; the record was dropped
/// * [`HandlerError::Closed`] - the worker has shut down; the record was dropped
pub fn enqueue(
    tx: &Sender<CloudCommand>,
    command: CloudCommand,
    policy: OverflowPolicy,
    warner: &RateLimitedWarner,
) -> Result<(), HandlerError> {
    let result = match policy {
        OverflowPolicy::Drop => tx.try_send(command).map_err(|err| match err {
            TrySendError::Full(_) => HandlerError::QueueFull,
            TrySendError::Disconnected(_) => HandlerError::Closed,
        }),
        OverflowPolicy::Block => tx.send(command).map_err(|_| HandlerError::Closed),
        OverflowPolicy::Timeout(timeout) => {
            tx.send_timeout(command, timeout).map_err(|err| match err {
                SendTimeoutError::Timeout(_) => HandlerError::QueueFull,
                SendTimeoutError::Disconnected(_) => HandlerError::Closed,
            })
        }
    };
    if let Err(err) = &result {
        warner.record_drop();
        warner.warn_if_due(|count| match err {
            HandlerError::QueueFull => {
                warn!("FemtoCloudHandler queue full; dropped {count} records");
            }
            _ => warn!("FemtoCloudHandler closed; dropped {count} records"),
        });
    }
    result
}

/// Send a flush marker and wait until the worker reaches it.
///
/// The total wait, send included, is bounded by `timeout`.
pub fn flush_queue(tx: &Sender<CloudCommand>, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    let (ack_tx, ack_rx) = bounded(1);
    if tx
        .send_timeout(CloudCommand::Flush(ack_tx), timeout)
        .is_err()
    {
        return false;
    }
    let remaining = deadline.saturating_duration_since(Instant::now());
    ack_rx.recv_timeout(remaining).is_ok()
}
