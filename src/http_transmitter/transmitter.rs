//! Blocking HTTP delivery over a pooled `ureq` agent.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use serde::Serialize;
use ureq::{Agent, AgentBuilder};

use crate::cloud_handler::{CloudEvent, CloudLog, TransmitError, Transmitter};

use super::config::{AuthConfig, HttpTransmitterConfig};

/// Posts each record as a JSON body to the endpoint for its kind.
///
/// Any 2xx response is a success. Every other status, and every transport
/// error, is returned as a [`TransmitError`]; there is no retry here.
pub struct HttpTransmitter {
    config: HttpTransmitterConfig,
    agent: Agent,
}

impl HttpTransmitter {
    pub fn with_config(config: HttpTransmitterConfig) -> Self {
        let agent = AgentBuilder::new()
            .timeout_connect(config.connect_timeout)
            .timeout(config.write_timeout)
            .build();
        Self { config, agent }
    }

    pub fn config(&self) -> &HttpTransmitterConfig {
        &self.config
    }

    fn post_json<T: Serialize>(&self, url: &str, record: &T) -> Result<(), TransmitError> {
        let body = serde_json::to_string(record)?;
        let mut req = self.agent.post(url);
        req = self.apply_auth(req);
        req = self.apply_headers(req);
        req = req.set("Content-Type", "application/json");
        match req.send_string(&body) {
            Ok(response) => check_status(response.status()),
            Err(ureq::Error::Status(code, _)) => Err(TransmitError::Status(code)),
            Err(ureq::Error::Transport(err)) => Err(TransmitError::Transport(err.to_string())),
        }
    }

    fn apply_auth(&self, req: ureq::Request) -> ureq::Request {
        match &self.config.auth {
            AuthConfig::None => req,
            AuthConfig::Basic { username, password } => {
                let encoded = base64_encode(format!("{username}:{password}").as_bytes());
                req.set("Authorization", &format!("Basic {encoded}"))
            }
            AuthConfig::Bearer { token } => req.set("Authorization", &format!("Bearer {token}")),
        }
    }

    fn apply_headers(&self, mut req: ureq::Request) -> ureq::Request {
        for (key, value) in &self.config.headers {
            req = req.set(key, value);
        }
        req
    }
}

impl Transmitter for HttpTransmitter {
    fn send_log(&self, log: &CloudLog) -> Result<(), TransmitError> {
        self.post_json(&self.config.log_url, log)
    }

    fn send_event(&self, event: &CloudEvent) -> Result<(), TransmitError> {
        self.post_json(&self.config.event_url, event)
    }
}

impl std::fmt::Debug for HttpTransmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransmitter")
            .field("log_url", &self.config.log_url)
            .field("event_url", &self.config.event_url)
            .finish_non_exhaustive()
    }
}

/// Only 2xx counts as delivered.
pub(crate) fn check_status(status: u16) -> Result<(), TransmitError> {
    match status {
        200..=299 => Ok(()),
        other => Err(TransmitError::Status(other)),
    }
}

/// Base64-encode a byte slice for Basic auth.
fn base64_encode(input: &[u8]) -> String {
    BASE64_STANDARD.encode(input)
}
