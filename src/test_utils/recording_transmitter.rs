//! In-memory [`Transmitter`] that records deliveries and can inject failures.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::cloud_handler::{CloudEvent, CloudLog, TransmitError, Transmitter};

/// One record accepted by a [`RecordingTransmitter`].
#[derive(Clone, Debug, PartialEq)]
pub enum Transmitted {
    Log(CloudLog),
    Event(CloudEvent),
}

impl Transmitted {
    /// The log message, or the event description.
    pub fn text(&self) -> &str {
        match self {
            Self::Log(log) => log.message(),
            Self::Event(event) => event.description(),
        }
    }
}

#[derive(Default)]
struct State {
    attempts: usize,
    delivered: Vec<Transmitted>,
    failing_calls: BTreeSet<usize>,
    fail_all: bool,
    delay: Option<Duration>,
}

/// Transmitter double. Clones share state.
///
/// Attempts are numbered from 1 in the order they reach the transmitter;
/// [`fail_on_call`](Self::fail_on_call) makes a specific attempt fail with
/// HTTP 503. Failed attempts are counted but not delivered.
#[derive(Clone, Default)]
pub struct RecordingTransmitter {
    state: Arc<Mutex<State>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl RecordingTransmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `call`-th attempt (1-based).
    pub fn fail_on_call(&self, call: usize) {
        self.state.lock().failing_calls.insert(call);
    }

    /// Fail every attempt while `failing` is set.
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().fail_all = failing;
    }

    /// Sleep for `delay` inside every attempt, widening race windows.
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().delay = Some(delay);
    }

    pub fn attempts(&self) -> usize {
        self.state.lock().attempts
    }

    pub fn delivered(&self) -> Vec<Transmitted> {
        self.state.lock().delivered.clone()
    }

    /// Texts of delivered records, in delivery order.
    pub fn delivered_texts(&self) -> Vec<String> {
        self.state
            .lock()
            .delivered
            .iter()
            .map(|t| t.text().to_owned())
            .collect()
    }

    /// Highest number of attempts observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, item: Transmitted) -> Result<(), TransmitError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let (fail, delay) = {
            let mut state = self.state.lock();
            state.attempts += 1;
            let fail = state.fail_all || state.failing_calls.contains(&state.attempts);
            (fail, state.delay)
        };
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        let result = if fail {
            Err(TransmitError::Status(503))
        } else {
            self.state.lock().delivered.push(item);
            Ok(())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl Transmitter for RecordingTransmitter {
    fn send_log(&self, log: &CloudLog) -> Result<(), TransmitError> {
        self.record(Transmitted::Log(log.clone()))
    }

    fn send_event(&self, event: &CloudEvent) -> Result<(), TransmitError> {
        self.record(Transmitted::Event(event.clone()))
    }
}
