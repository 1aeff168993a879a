//! Front-end fan-out to several handlers.

use std::sync::Arc;

use femtorelay::filters::FilterBuilderTrait;
use femtorelay::handlers::{CloudHandlerBuilder, HandlerBuilderTrait};
use femtorelay::test_utils::{CollectingHandler, RecordingTransmitter};
use femtorelay::{
    ConnectivityFlag, FemtoFilter, FemtoHandlerTrait, FemtoLevel, FemtoLogger,
    GroupFilterBuilder, MemoryBacklog,
};
use rstest::rstest;

#[rstest]
fn every_handler_sees_records_even_when_one_fails() {
    let logger = FemtoLogger::new();
    logger.set_level(FemtoLevel::Trace);
    let first = CollectingHandler::new();
    let broken = CollectingHandler::failing();
    let last = CollectingHandler::new();
    logger.add_handler(Arc::new(first.clone()));
    logger.add_handler(Arc::new(broken.clone()));
    logger.add_handler(Arc::new(last.clone()));

    assert!(logger.warn("pressure high"));
    assert!(logger.trace("tick"));

    assert_eq!(first.messages(), ["pressure high", "tick"]);
    assert_eq!(broken.messages(), ["pressure high", "tick"]);
    assert_eq!(last.messages(), ["pressure high", "tick"]);
}

#[rstest]
fn cloud_handler_applies_its_own_floor_behind_the_logger() {
    let transmitter = RecordingTransmitter::new();
    let backlog = MemoryBacklog::new();
    let cloud = CloudHandlerBuilder::new()
        .with_memory_backlog(backlog)
        .with_connectivity(Arc::new(ConnectivityFlag::new(true)))
        .with_transmitter(Arc::new(transmitter.clone()))
        .with_flush_timeout_ms(5_000)
        .build()
        .expect("cloud handler");
    let local = CollectingHandler::new();

    let logger = FemtoLogger::with_handlers([
        Arc::clone(&cloud),
        Arc::new(local.clone()) as Arc<dyn FemtoHandlerTrait>,
    ]);
    logger.set_level(FemtoLevel::Debug);

    logger.debug("calibrating");
    logger.info("calibrated");
    logger.error_in("sensors", "sensor offline");
    assert!(logger.flush_handlers());

    assert_eq!(
        local.messages(),
        ["calibrating", "calibrated", "sensor offline"]
    );
    assert_eq!(transmitter.delivered_texts(), ["calibrated", "sensor offline"]);
}

#[rstest]
fn group_filter_limits_fan_out() {
    let logger = FemtoLogger::new();
    logger.set_level(FemtoLevel::Information);
    let filter: Arc<dyn FemtoFilter> = GroupFilterBuilder::new()
        .with_group("network")
        .with_allow_ungrouped(false)
        .build()
        .expect("filter");
    logger.add_filter(filter);
    let collected = CollectingHandler::new();
    logger.add_handler(Arc::new(collected.clone()));

    assert!(logger.info_in("network", "link up"));
    assert!(!logger.info_in("storage", "mounted"));
    assert!(!logger.info("ungrouped"));

    assert_eq!(collected.messages(), ["link up"]);
}
