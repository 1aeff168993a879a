//! Property tests for record lines and store-and-forward ordering.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use femtorelay::cloud_handler::CloudRecord;
use femtorelay::test_utils::RecordingTransmitter;
use femtorelay::{
    CloudEvent, CloudLog, ConnectivityFlag, FemtoLevel, MeasurementValue, Measurements,
    MemoryBacklog, OfflineForwarder, RecordKind,
};
use proptest::prelude::*;

fn level() -> impl Strategy<Value = FemtoLevel> {
    prop_oneof![
        Just(FemtoLevel::Trace),
        Just(FemtoLevel::Debug),
        Just(FemtoLevel::Information),
        Just(FemtoLevel::Warning),
        Just(FemtoLevel::Error),
    ]
}

fn measurement() -> impl Strategy<Value = MeasurementValue> {
    prop_oneof![
        any::<bool>().prop_map(MeasurementValue::from),
        any::<i64>().prop_map(MeasurementValue::from),
        (-1_000_000i32..1_000_000).prop_map(|n| MeasurementValue::from(f64::from(n) / 4.0)),
        ".*".prop_map(MeasurementValue::from),
    ]
}

proptest! {
    #[test]
    fn log_lines_round_trip(
        severity in level(),
        message in ".*",
        exception in proptest::option::of(".*"),
        secs in 0i64..4_000_000_000,
    ) {
        let at = Utc.timestamp_opt(secs, 0).single().expect("valid timestamp");
        let log = CloudLog::with_timestamp(severity, message, exception, at);
        let line = log.to_line().expect("serialise");
        prop_assert!(!line.contains('\n'));
        prop_assert_eq!(CloudLog::from_line(&line).expect("parse"), log);
    }

    #[test]
    fn event_lines_round_trip(
        event_id in any::<i32>(),
        description in ".*",
        measurements in proptest::collection::btree_map("[a-z]{1,8}", measurement(), 0..6),
    ) {
        let at = Utc.timestamp_opt(1_700_000_000, 0).single().expect("valid timestamp");
        let event = CloudEvent::with_timestamp(event_id, description, measurements, at);
        let line = event.to_line().expect("serialise");
        prop_assert!(!line.contains('\n'));
        prop_assert_eq!(CloudEvent::from_line(&line).expect("parse"), event);
    }

    /// With a reliable transmitter every record is delivered exactly once, in
    /// submission order, by the time an online dispatch completes; whatever
    /// follows the last online dispatch is still parked.
    #[test]
    fn delivery_preserves_submission_order(
        steps in proptest::collection::vec(any::<bool>(), 1..40),
    ) {
        let backlog = MemoryBacklog::new();
        let flag = ConnectivityFlag::new(false);
        let transmitter = RecordingTransmitter::new();
        let forwarder = OfflineForwarder::new(
            Box::new(backlog.clone()),
            Arc::new(flag.clone()),
            Arc::new(transmitter.clone()),
        );

        let mut submitted = Vec::new();
        let mut delivered_upto = 0;
        for (index, online) in steps.iter().enumerate() {
            flag.set_connected(*online);
            let message = format!("record-{index}");
            forwarder.dispatch(&CloudLog::new(FemtoLevel::Error, message.clone()));
            submitted.push(message);
            if *online {
                delivered_upto = submitted.len();
            }
        }

        prop_assert_eq!(transmitter.delivered_texts(), submitted[..delivered_upto].to_vec());
        let parked: Vec<String> = backlog
            .lines(RecordKind::Log)
            .iter()
            .map(|line| CloudLog::from_line(line).expect("parse").message().to_owned())
            .collect();
        prop_assert_eq!(parked, submitted[delivered_upto..].to_vec());
    }
}

#[test]
fn measurements_keep_their_json_types() {
    let measurements = Measurements::from([
        ("count".to_owned(), MeasurementValue::from(3)),
        ("ratio".to_owned(), MeasurementValue::from(0.5)),
        ("ok".to_owned(), MeasurementValue::from(true)),
        ("unit".to_owned(), MeasurementValue::from("C")),
    ]);
    let event = CloudEvent::new(1, "types", measurements);
    let value: serde_json::Value =
        serde_json::from_str(&event.to_line().expect("serialise")).expect("json");
    assert!(value["measurements"]["count"].is_i64());
    assert!(value["measurements"]["ratio"].is_f64());
    assert!(value["measurements"]["ok"].is_boolean());
    assert!(value["measurements"]["unit"].is_string());
}
