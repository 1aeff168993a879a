//! Builder for [`FemtoCloudHandler`](crate::cloud_handler::FemtoCloudHandler).
//!
//! Collects the minimum level, backlog location, queue settings, the
//! connectivity oracle and the transmitter, validates them, and then opens
//! the backlog and starts the worker.

use std::{fmt, path::PathBuf, sync::Arc, time::Duration};

use crate::cloud_handler::{
    BacklogError, BacklogPaths, BacklogStore, CloudHandlerConfig, Connectivity,
    DEFAULT_EVENT_BACKLOG, DEFAULT_LOG_BACKLOG, FemtoCloudHandler, FileBacklog, MIN_CLOUD_LEVEL,
    MemoryBacklog, OfflineForwarder, OverflowPolicy, RecordKind, Transmitter,
};
use crate::level::FemtoLevel;

use super::{HandlerBuildError, HandlerBuilderTrait, ensure_positive};

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

#[derive(Clone, Debug)]
enum BacklogChoice {
    Documents(PathBuf),
    Memory(MemoryBacklog),
}

/// Builder for constructing [`FemtoCloudHandler`] instances.
#[derive(Clone, Default)]
pub struct CloudHandlerBuilder {
    min_level: Option<FemtoLevel>,
    backlog: Option<BacklogChoice>,
    log_file_name: Option<String>,
    event_file_name: Option<String>,
    capacity: Option<usize>,
    flush_timeout_ms: Option<u64>,
    overflow_policy: Option<OverflowPolicy>,
    connectivity: Option<Arc<dyn Connectivity>>,
    transmitter: Option<Arc<dyn Transmitter>>,
}

impl CloudHandlerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    option_setter!(
        #[doc = "Set the minimum level. Must be Information or higher."]
        with_min_level,
        min_level,
        FemtoLevel
    );
    option_setter!(
        #[doc = "Set the bounded queue capacity."]
        with_capacity,
        capacity,
        usize
    );
    option_setter!(
        #[doc = "Bound `flush` and `close` by this many milliseconds."]
        with_flush_timeout_ms,
        flush_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Choose what happens when the queue is full."]
        with_overflow_policy,
        overflow_policy,
        OverflowPolicy
    );

    /// Persist backlogs as files in `dir` (created if missing).
    pub fn with_documents_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backlog = Some(BacklogChoice::Documents(dir.into()));
        self
    }

    /// Keep backlogs in memory. Replaces any documents directory.
    pub fn with_memory_backlog(mut self, backlog: MemoryBacklog) -> Self {
        self.backlog = Some(BacklogChoice::Memory(backlog));
        self
    }

    /// Override the backlog file names used inside the documents directory.
    pub fn with_backlog_file_names(
        mut self,
        log_name: impl Into<String>,
        event_name: impl Into<String>,
    ) -> Self {
        self.log_file_name = Some(log_name.into());
        self.event_file_name = Some(event_name.into());
        self
    }

    /// Set the reachability oracle (required).
    pub fn with_connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    /// Set the transmitter (required).
    pub fn with_transmitter(mut self, transmitter: Arc<dyn Transmitter>) -> Self {
        self.transmitter = Some(transmitter);
        self
    }

    fn validate(&self) -> Result<(), HandlerBuildError> {
        if let Some(level) = self.min_level
            && level < MIN_CLOUD_LEVEL
        {
            return Err(HandlerBuildError::SeverityBelowFloor {
                requested: level,
                floor: MIN_CLOUD_LEVEL,
            });
        }
        if let Some(capacity) = self.capacity {
            ensure_positive(capacity, "capacity")?;
        }
        if let Some(timeout) = self.flush_timeout_ms {
            ensure_positive(timeout, "flush_timeout_ms")?;
        }
        if let Some(OverflowPolicy::Timeout(timeout)) = self.overflow_policy {
            ensure_positive(timeout, "overflow timeout")?;
        }
        for name in [&self.log_file_name, &self.event_file_name]
            .into_iter()
            .flatten()
        {
            validate_file_name(name)?;
        }
        if self.log_file_name.is_some() && self.log_file_name == self.event_file_name {
            return Err(HandlerBuildError::InvalidConfig(
                "log and event backlogs must use different files".into(),
            ));
        }
        if self.backlog.is_none() {
            return Err(HandlerBuildError::InvalidConfig(
                "cloud handler requires a documents directory or a memory backlog".into(),
            ));
        }
        if self.connectivity.is_none() {
            return Err(HandlerBuildError::InvalidConfig(
                "cloud handler requires a connectivity oracle".into(),
            ));
        }
        if self.transmitter.is_none() {
            return Err(HandlerBuildError::InvalidConfig(
                "cloud handler requires a transmitter".into(),
            ));
        }
        Ok(())
    }

    fn build_config(&self) -> CloudHandlerConfig {
        let defaults = CloudHandlerConfig::default();
        CloudHandlerConfig {
            min_level: self.min_level.unwrap_or(defaults.min_level),
            capacity: self.capacity.unwrap_or(defaults.capacity),
            flush_timeout: self
                .flush_timeout_ms
                .map_or(defaults.flush_timeout, Duration::from_millis),
            overflow_policy: self.overflow_policy.unwrap_or(defaults.overflow_policy),
            warn_interval: defaults.warn_interval,
        }
    }

    fn open_backlog(
        &self,
    ) -> Result<(Box<dyn BacklogStore>, Option<BacklogPaths>), HandlerBuildError> {
        match &self.backlog {
            Some(BacklogChoice::Memory(backlog)) => Ok((Box::new(backlog.clone()), None)),
            Some(BacklogChoice::Documents(dir)) => {
                let backlog = FileBacklog::open_with_names(
                    dir,
                    self.log_file_name.as_deref().unwrap_or(DEFAULT_LOG_BACKLOG),
                    self.event_file_name.as_deref().unwrap_or(DEFAULT_EVENT_BACKLOG),
                )
                .map_err(|err| match err {
                    BacklogError::Io(io) => HandlerBuildError::Io(io),
                    other => HandlerBuildError::InvalidConfig(other.to_string()),
                })?;
                let paths = BacklogPaths {
                    log: backlog.path(RecordKind::Log).to_path_buf(),
                    event: backlog.path(RecordKind::Event).to_path_buf(),
                };
                Ok((Box::new(backlog), Some(paths)))
            }
            None => Err(HandlerBuildError::InvalidConfig(
                "cloud handler requires a documents directory or a memory backlog".into(),
            )),
        }
    }

    fn forwarder_parts(
        &self,
    ) -> Result<(OfflineForwarder, Option<BacklogPaths>), HandlerBuildError> {
        self.validate()?;
        let (Some(connectivity), Some(transmitter)) = (&self.connectivity, &self.transmitter)
        else {
            return Err(HandlerBuildError::InvalidConfig(
                "cloud handler requires a connectivity oracle and a transmitter".into(),
            ));
        };
        let (backlog, paths) = self.open_backlog()?;
        let forwarder =
            OfflineForwarder::new(backlog, Arc::clone(connectivity), Arc::clone(transmitter));
        Ok((forwarder, paths))
    }

    /// Build only the synchronous forwarder, without a worker thread.
    pub fn build_forwarder(&self) -> Result<OfflineForwarder, HandlerBuildError> {
        self.forwarder_parts().map(|(forwarder, _)| forwarder)
    }
}

fn validate_file_name(name: &str) -> Result<(), HandlerBuildError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
        return Err(HandlerBuildError::InvalidConfig(format!(
            "invalid backlog file name {name:?}"
        )));
    }
    Ok(())
}

impl HandlerBuilderTrait for CloudHandlerBuilder {
    type Handler = FemtoCloudHandler;

    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError> {
        let (forwarder, paths) = self.forwarder_parts()?;
        Ok(FemtoCloudHandler::with_config(
            self.build_config(),
            forwarder,
            paths,
        )?)
    }
}

impl fmt::Debug for CloudHandlerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudHandlerBuilder")
            .field("min_level", &self.min_level)
            .field("backlog", &self.backlog)
            .field("log_file_name", &self.log_file_name)
            .field("event_file_name", &self.event_file_name)
            .field("capacity", &self.capacity)
            .field("flush_timeout_ms", &self.flush_timeout_ms)
            .field("overflow_policy", &self.overflow_policy)
            .field("connectivity", &self.connectivity.is_some())
            .field("transmitter", &self.transmitter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud_handler::ConnectivityFlag;
    use crate::test_utils::RecordingTransmitter;
    use rstest::rstest;

    fn complete() -> CloudHandlerBuilder {
        CloudHandlerBuilder::new()
            .with_memory_backlog(MemoryBacklog::new())
            .with_connectivity(Arc::new(ConnectivityFlag::new(false)))
            .with_transmitter(Arc::new(RecordingTransmitter::new()))
    }

    #[rstest]
    #[case(FemtoLevel::Trace)]
    #[case(FemtoLevel::Debug)]
    fn rejects_level_below_floor(#[case] level: FemtoLevel) {
        let err = complete()
            .with_min_level(level)
            .build_inner()
            .expect_err("below floor");
        assert!(matches!(
            err,
            HandlerBuildError::SeverityBelowFloor { requested, floor }
                if requested == level && floor == FemtoLevel::Information
        ));
    }

    #[rstest]
    #[case(FemtoLevel::Information)]
    #[case(FemtoLevel::Warning)]
    #[case(FemtoLevel::Error)]
    fn accepts_level_at_or_above_floor(#[case] level: FemtoLevel) {
        let handler = complete().with_min_level(level).build_inner().expect("build");
        assert_eq!(handler.min_level(), level);
    }

    #[test]
    fn default_level_is_information() {
        let handler = complete().build_inner().expect("build");
        assert_eq!(handler.min_level(), FemtoLevel::Information);
        assert!(handler.backlog_paths().is_none());
    }

    #[rstest]
    #[case(complete().with_capacity(0), "capacity")]
    #[case(complete().with_flush_timeout_ms(0), "flush_timeout_ms")]
    #[case(
        complete().with_overflow_policy(OverflowPolicy::Timeout(Duration::ZERO)),
        "overflow timeout"
    )]
    #[case(complete().with_backlog_file_names("", "events.log"), "invalid backlog file name")]
    #[case(complete().with_backlog_file_names("a/b", "events.log"), "invalid backlog file name")]
    #[case(complete().with_backlog_file_names("same", "same"), "different files")]
    fn rejects_invalid_settings(#[case] builder: CloudHandlerBuilder, #[case] needle: &str) {
        let err = builder.build_inner().expect_err("invalid");
        assert!(err.to_string().contains(needle), "unexpected error: {err}");
    }

    #[rstest]
    #[case(CloudHandlerBuilder::new()
        .with_connectivity(Arc::new(ConnectivityFlag::new(true)))
        .with_transmitter(Arc::new(RecordingTransmitter::new())), "documents directory")]
    #[case(CloudHandlerBuilder::new()
        .with_memory_backlog(MemoryBacklog::new())
        .with_transmitter(Arc::new(RecordingTransmitter::new())), "connectivity")]
    #[case(CloudHandlerBuilder::new()
        .with_memory_backlog(MemoryBacklog::new())
        .with_connectivity(Arc::new(ConnectivityFlag::new(true))), "transmitter")]
    fn rejects_missing_parts(#[case] builder: CloudHandlerBuilder, #[case] needle: &str) {
        let err = builder.build_inner().expect_err("incomplete");
        assert!(err.to_string().contains(needle), "unexpected error: {err}");
    }

    #[test]
    fn documents_dir_creates_backlog_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let handler = complete()
            .with_documents_dir(dir.path())
            .with_backlog_file_names("logs.jsonl", "events.jsonl")
            .build_inner()
            .expect("build");
        let log_path = handler.log_backlog_path().expect("file backlog");
        let event_path = handler.event_backlog_path().expect("file backlog");
        assert_eq!(log_path, dir.path().join("logs.jsonl"));
        assert_eq!(event_path, dir.path().join("events.jsonl"));
        assert!(log_path.exists() && event_path.exists());
    }
}
