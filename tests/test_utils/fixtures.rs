//! rstest fixtures wiring a cloud handler to test doubles.

use std::sync::Arc;

use femtorelay::handlers::CloudHandlerBuilder;
use femtorelay::test_utils::RecordingTransmitter;
use femtorelay::ConnectivityFlag;
use rstest::fixture;
use tempfile::TempDir;

/// A documents directory plus the switches a cloud handler depends on.
pub struct CloudRig {
    pub docs: TempDir,
    pub flag: ConnectivityFlag,
    pub transmitter: RecordingTransmitter,
}

impl CloudRig {
    /// Builder using a file backlog in `docs`.
    pub fn builder(&self) -> CloudHandlerBuilder {
        CloudHandlerBuilder::new()
            .with_documents_dir(self.docs.path())
            .with_connectivity(Arc::new(self.flag.clone()))
            .with_transmitter(Arc::new(self.transmitter.clone()))
            .with_flush_timeout_ms(5_000)
    }
}

#[fixture]
pub fn cloud_rig() -> CloudRig {
    CloudRig {
        docs: tempfile::tempdir().expect("temp documents dir"),
        flag: ConnectivityFlag::new(false),
        transmitter: RecordingTransmitter::new(),
    }
}
