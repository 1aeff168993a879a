//! Store-and-forward shipping of logs, exceptions and events to the cloud.
//!
//! [`FemtoCloudHandler`] is the entry point. Records submitted to it are
//! queued for a worker thread that drives an [`OfflineForwarder`]:
//!
//! - **Offline**: the record is serialised to one JSON line and appended
//!   to its kind's [`BacklogStore`].
//! - **Online**: the backlog is replayed oldest first, cleared, and only
//!   then is the new record transmitted.
//!
//! Reachability comes from a [`Connectivity`] oracle, delivery from a
//! [`Transmitter`]. Replayed entries that are not UTF-8 or fail to parse are skipped. A
//! failed send is never retried by the forwarder itself; an entry is only
//! retried if it is still in the backlog when a later dispatch finds the
//! endpoint reachable.

mod backlog;
mod config;
mod connectivity;
mod forwarder;
mod handler;
mod record;
mod transmitter;
mod worker;


pub use backlog::{
    BacklogError, BacklogLine, BacklogStore, DEFAULT_EVENT_BACKLOG, DEFAULT_LOG_BACKLOG,
    FileBacklog, MemoryBacklog,
};
pub use config::{
    CloudHandlerConfig, DEFAULT_CHANNEL_CAPACITY, DEFAULT_FLUSH_TIMEOUT, MIN_CLOUD_LEVEL,
    OverflowPolicy,
};
pub use connectivity::{
    CloudSession, Connectivity, ConnectivityFlag, LinkAndSession, NetworkAdapter, SessionState,
};
pub use forwarder::{DispatchOutcome, DropReason, OfflineForwarder};
pub use handler::{BacklogPaths, FemtoCloudHandler};
pub use record::{CloudEvent, CloudLog, CloudRecord, MeasurementValue, Measurements, RecordKind};
pub use transmitter::{TransmitError, Transmitter};
