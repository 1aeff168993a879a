//! Configuration consumed by [`FemtoCloudHandler`](super::FemtoCloudHandler).
//!
//! `CloudHandlerBuilder` validates user input and produces these values.

use std::time::Duration;

use crate::level::FemtoLevel;
use crate::rate_limited_warner::DEFAULT_WARN_INTERVAL;

/// Lowest severity the cloud handler may be configured to accept.
///
/// Per-record forwarder diagnostics are emitted at debug level, below this
/// floor. Aggregated drop counts (corrupt backlog entries, a full or closed
/// queue) are rate-limited warnings.
pub const MIN_CLOUD_LEVEL: FemtoLevel = FemtoLevel::Information;
/// Default bounded channel capacity between submitters and the worker.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
/// Default upper bound on `flush` and `close`.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(30);

/// Behaviour when the submit queue is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Drop the record and return immediately. The record is neither sent
    /// nor persisted.
    #[default]
    Drop,
    /// Wait until the worker makes room.
    Block,
    /// Wait up to the given duration, then drop.
    Timeout(Duration),
}

#[derive(Clone, Debug)]
pub struct CloudHandlerConfig {
    /// Records below this level are discarded by `submit_log`.
    pub min_level: FemtoLevel,
    pub capacity: usize,
    pub flush_timeout: Duration,
    pub overflow_policy: OverflowPolicy,
    /// Interval between rate-limited drop warnings.
    pub warn_interval: Duration,
}

impl Default for CloudHandlerConfig {
    fn default() -> Self {
        Self {
            min_level: MIN_CLOUD_LEVEL,
            capacity: DEFAULT_CHANNEL_CAPACITY,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            overflow_policy: OverflowPolicy::default(),
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }
}
