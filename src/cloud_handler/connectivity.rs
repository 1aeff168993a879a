//! Answers whether the cloud endpoint is currently reachable.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Reachability check consulted once per dispatch.
///
/// Implementations must not cache: every call reflects the state at the
/// time of the call.
pub trait Connectivity: Send + Sync {
    fn is_connected(&self) -> bool;
}

impl<F> Connectivity for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_connected(&self) -> bool {
        self()
    }
}

/// A network interface whose link state can be queried.
pub trait NetworkAdapter: Send + Sync {
    fn is_link_up(&self) -> bool;
}

/// Application-level session with the cloud service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Authenticating,
    Connected,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Authenticating => "authenticating",
            Self::Connected => "connected",
        };
        f.write_str(label)
    }
}

pub trait CloudSession: Send + Sync {
    fn state(&self) -> SessionState;
}

/// Connected when any adapter has a link AND the session is `Connected`.
pub struct LinkAndSession {
    adapters: Vec<Arc<dyn NetworkAdapter>>,
    session: Arc<dyn CloudSession>,
}

impl LinkAndSession {
    pub fn new(adapters: Vec<Arc<dyn NetworkAdapter>>, session: Arc<dyn CloudSession>) -> Self {
        Self { adapters, session }
    }
}

impl Connectivity for LinkAndSession {
    fn is_connected(&self) -> bool {
        self.adapters.iter().any(|adapter| adapter.is_link_up())
            && self.session.state() == SessionState::Connected
    }
}

impl fmt::Debug for LinkAndSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkAndSession")
            .field("adapters", &self.adapters.len())
            .finish_non_exhaustive()
    }
}

/// Shared switch for callers that learn about connectivity by events.
/// Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct ConnectivityFlag(Arc<AtomicBool>);

impl ConnectivityFlag {
    pub fn new(connected: bool) -> Self {
        Self(Arc::new(AtomicBool::new(connected)))
    }

    pub fn set_connected(&self, connected: bool) {
        self.0.store(connected, Ordering::SeqCst);
    }
}

impl Connectivity for ConnectivityFlag {
    fn is_connected(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
