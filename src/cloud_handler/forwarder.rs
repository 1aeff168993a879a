//! Store-and-forward dispatch of cloud records.
//!
//! [`OfflineForwarder`] decides, per record, whether to transmit now or
//! persist to the backlog. All dispatches share one lock: the connectivity
//! check, the backlog append, and the whole replay-then-send sequence run
//! inside it, so at most one drain is ever in flight and replayed records
//! always precede the record that triggered the drain.

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;

use crate::rate_limited_warner::RateLimitedWarner;

use super::backlog::{BacklogError, BacklogLine, BacklogStore};
use super::connectivity::Connectivity;
use super::record::{CloudRecord, RecordKind};
use super::transmitter::Transmitter;

/// Why a dispatched record was lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// The backlog could not be read, appended to, or cleared.
    Storage,
    /// Replaying a backlog entry failed; the backlog was kept.
    Replay,
    /// The record itself could not be transmitted.
    Transmit,
}

/// What a single dispatch did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Offline: the record was appended to its backlog.
    Persisted,
    /// Online: `replayed` backlog entries were sent, `skipped` corrupt
    /// entries discarded, then the record itself was sent.
    Delivered { replayed: usize, skipped: usize },
    Dropped(DropReason),
}

impl DispatchOutcome {
    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped(_))
    }
}

struct Replay {
    sent: usize,
    skipped: usize,
    had_lines: bool,
}

/// Synchronous store-and-forward core.
///
/// Owns its backlog exclusively. Safe to share between threads; concurrent
/// dispatches are serialised.
pub struct OfflineForwarder {
    backlog: Mutex<Box<dyn BacklogStore>>,
    connectivity: Arc<dyn Connectivity>,
    transmitter: Arc<dyn Transmitter>,
    corrupt_warner: RateLimitedWarner,
}

impl OfflineForwarder {
    pub fn new(
        backlog: Box<dyn BacklogStore>,
        connectivity: Arc<dyn Connectivity>,
        transmitter: Arc<dyn Transmitter>,
    ) -> Self {
        Self {
            backlog: Mutex::new(backlog),
            connectivity,
            transmitter,
            corrupt_warner: RateLimitedWarner::default(),
        }
    }

    /// Transmit `record` after draining its backlog, or persist it when the
    /// endpoint is unreachable.
    ///
    /// Never fails: storage and delivery problems are logged at debug level
    /// and reported through the returned outcome. Skipped corrupt entries are
    /// also summarised by a rate-limited warning.
    pub fn dispatch<R: CloudRecord>(&self, record: &R) -> DispatchOutcome {
        let mut backlog = self.backlog.lock();

        if !self.connectivity.is_connected() {
            return match persist(backlog.as_mut(), record) {
                Ok(()) => {
                    debug!("OfflineForwarder: offline, {} record persisted", R::KIND);
                    DispatchOutcome::Persisted
                }
                Err(err) => {
                    debug!("OfflineForwarder: failed to persist {} record: {err}", R::KIND);
                    DispatchOutcome::Dropped(DropReason::Storage)
                }
            };
        }

        let replay = match self.replay::<R>(backlog.as_mut()) {
            Ok(replay) => replay,
            Err(reason) => return DispatchOutcome::Dropped(reason),
        };
        if replay.had_lines
            && let Err(err) = backlog.clear(R::KIND)
        {
            debug!("OfflineForwarder: failed to clear {} backlog: {err}", R::KIND);
            return DispatchOutcome::Dropped(DropReason::Storage);
        }

        if let Err(err) = record.transmit(self.transmitter.as_ref()) {
            debug!("OfflineForwarder: failed to send {} record: {err}", R::KIND);
            return DispatchOutcome::Dropped(DropReason::Transmit);
        }
        DispatchOutcome::Delivered {
            replayed: replay.sent,
            skipped: replay.skipped,
        }
    }

    /// Send every well-formed backlog entry of `R`'s kind, oldest first.
    fn replay<R: CloudRecord>(&self, backlog: &mut dyn BacklogStore) -> Result<Replay, DropReason> {
        let lines = backlog.read_all(R::KIND).map_err(|err| {
            debug!("OfflineForwarder: failed to read {} backlog: {err}", R::KIND);
            DropReason::Storage
        })?;
        let mut replay = Replay {
            sent: 0,
            skipped: 0,
            had_lines: !lines.is_empty(),
        };

        for line in &lines {
            let text = match line.as_text() {
                Ok(text) if text.trim().is_empty() => continue,
                Ok(text) => text,
                Err(err) => {
                    self.skip_corrupt::<R>(&mut replay, err);
                    continue;
                }
            };
            let entry = match R::from_line(text) {
                Ok(entry) => entry,
                Err(err) => {
                    self.skip_corrupt::<R>(&mut replay, &err);
                    continue;
                }
            };
            if let Err(err) = entry.transmit(self.transmitter.as_ref()) {
                debug!(
                    "OfflineForwarder: replay of {} backlog stopped after {} entries: {err}",
                    R::KIND,
                    replay.sent
                );
                return Err(DropReason::Replay);
            }
            replay.sent += 1;
        }

        self.corrupt_warner.warn_if_due(|count| {
            warn!("OfflineForwarder discarded {count} corrupt backlog entries");
        });
        Ok(replay)
    }

    fn skip_corrupt<R: CloudRecord>(&self, replay: &mut Replay, err: &dyn fmt::Display) {
        debug!("OfflineForwarder: skipping corrupt {} entry: {err}", R::KIND);
        replay.skipped += 1;
        self.corrupt_warner.record_drop();
    }

    /// Current contents of `kind`'s backlog, oldest first.
    pub fn backlog_snapshot(&self, kind: RecordKind) -> Result<Vec<BacklogLine>, BacklogError> {
        self.backlog.lock().read_all(kind)
    }
}

fn persist<R: CloudRecord>(backlog: &mut dyn BacklogStore, record: &R) -> Result<(), BacklogError> {
    let line = record.to_line()?;
    backlog.append(R::KIND, &line)
}

impl fmt::Debug for OfflineForwarder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OfflineForwarder")
            .field("connected", &self.connectivity.is_connected())
            .finish_non_exhaustive()
    }
}
