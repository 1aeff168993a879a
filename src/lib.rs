//! Store-and-forward logging for devices with intermittent connectivity.
//!
//! A [`FemtoLogger`] fans records out to handlers. [`FemtoCloudHandler`]
//! ships logs, exceptions and telemetry events to a cloud endpoint, parking
//! them in an on-disk backlog while the device is offline and replaying that
//! backlog, oldest first, the next time a record is dispatched online. Local
//! sinks cover the console, the `log` facade, UDP broadcast and a plain file.

pub mod cloud_handler;
pub mod debug_handler;
pub mod file_config;
pub mod file_handler;
pub mod filters;
pub mod formatter;
pub mod handler;
pub mod handlers;
pub mod http_transmitter;
pub mod level;
pub mod log_record;
pub mod logger;
pub mod rate_limited_warner;
pub mod stream_handler;
pub mod udp_handler;

#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use cloud_handler::{
    BacklogStore, CloudEvent, CloudLog, Connectivity, ConnectivityFlag, DispatchOutcome,
    FemtoCloudHandler, FileBacklog, LinkAndSession, MeasurementValue, Measurements,
    MemoryBacklog, OfflineForwarder, OverflowPolicy, RecordKind, TransmitError, Transmitter,
};
pub use debug_handler::FemtoDebugHandler;
pub use file_config::{CloudFileConfig, ConfigFileError, load_cloud_config, parse_cloud_config};
pub use file_handler::FemtoFileHandler;
pub use filters::{FemtoFilter, GroupFilterBuilder, LevelFilterBuilder};
pub use formatter::{ConsoleFormatter, DefaultFormatter, FemtoFormatter};
pub use handler::{FemtoHandlerTrait, HandlerError};
pub use handlers::{
    CloudHandlerBuilder, HandlerBuildError, HandlerBuilderTrait, HttpTransmitterBuilder,
};
pub use http_transmitter::HttpTransmitter;
pub use level::{FemtoLevel, ParseLevelError};
pub use log_record::FemtoLogRecord;
pub use logger::FemtoLogger;
pub use stream_handler::FemtoStreamHandler;
pub use udp_handler::{FemtoUdpHandler, UdpHandlerConfig};
