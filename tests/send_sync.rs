//! Send/Sync guarantees for core types.

use femtorelay::cloud_handler::{FemtoCloudHandler, OfflineForwarder};
use femtorelay::{
    CloudHandlerBuilder, ConnectivityFlag, FemtoDebugHandler, FemtoFileHandler, FemtoLogger,
    FemtoStreamHandler, FemtoUdpHandler, HttpTransmitter, HttpTransmitterBuilder, LinkAndSession,
    MemoryBacklog,
};
use rstest::rstest;
use static_assertions::assert_impl_all;

#[rstest]
fn builders_are_send_sync() {
    assert_impl_all!(CloudHandlerBuilder: Send, Sync);
    assert_impl_all!(HttpTransmitterBuilder: Send, Sync);
}

#[rstest]
fn components_are_send_sync() {
    assert_impl_all!(FemtoLogger: Send, Sync);
    assert_impl_all!(FemtoCloudHandler: Send, Sync);
    assert_impl_all!(OfflineForwarder: Send, Sync);
    assert_impl_all!(FemtoStreamHandler: Send, Sync);
    assert_impl_all!(FemtoFileHandler: Send, Sync);
    assert_impl_all!(FemtoUdpHandler: Send, Sync);
    assert_impl_all!(FemtoDebugHandler: Send, Sync);
    assert_impl_all!(HttpTransmitter: Send, Sync);
    assert_impl_all!(ConnectivityFlag: Send, Sync);
    assert_impl_all!(LinkAndSession: Send, Sync);
    assert_impl_all!(MemoryBacklog: Send, Sync);
}
