//! Configuration consumed by [`HttpTransmitter`](super::HttpTransmitter).
//!
//! `HttpTransmitterBuilder` constructs these values after validation.

use std::collections::HashMap;
use std::time::Duration;

/// Default connection timeout applied when establishing HTTP connections.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default timeout for a whole request, body upload included.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Authentication configuration for HTTP requests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthConfig {
    /// No authentication.
    #[default]
    None,
    /// HTTP Basic authentication with username and password.
    Basic { username: String, password: String },
    /// Bearer token authentication.
    Bearer { token: String },
}

#[derive(Clone, Debug)]
pub struct HttpTransmitterConfig {
    /// Endpoint receiving log entries.
    pub log_url: String,
    /// Endpoint receiving events.
    pub event_url: String,
    pub auth: AuthConfig,
    /// Additional HTTP headers to include in requests.
    pub headers: HashMap<String, String>,
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for HttpTransmitterConfig {
    fn default() -> Self {
        Self {
            log_url: String::new(),
            event_url: String::new(),
            auth: AuthConfig::default(),
            headers: HashMap::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}
