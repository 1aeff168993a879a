//! Builder for [`HttpTransmitter`](crate::http_transmitter::HttpTransmitter).
//!
//! Exposes the log and event endpoints, authentication, extra headers and
//! timeouts.

use std::{collections::HashMap, time::Duration};

use crate::http_transmitter::{AuthConfig, HttpTransmitter, HttpTransmitterConfig};

use super::{HandlerBuildError, ensure_positive};

/// Builder for constructing [`HttpTransmitter`] instances.
#[derive(Clone, Debug, Default)]
pub struct HttpTransmitterBuilder {
    log_url: Option<String>,
    event_url: Option<String>,
    auth: Option<AuthConfig>,
    headers: HashMap<String, String>,
    connect_timeout_ms: Option<u64>,
    write_timeout_ms: Option<u64>,
}

impl HttpTransmitterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint receiving log entries (required).
    pub fn with_log_url(mut self, url: impl Into<String>) -> Self {
        self.log_url = Some(url.into());
        self
    }

    /// Set the endpoint receiving events (required).
    pub fn with_event_url(mut self, url: impl Into<String>) -> Self {
        self.event_url = Some(url.into());
        self
    }

    /// Configure HTTP Basic authentication.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth = Some(AuthConfig::Basic {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Configure Bearer token authentication.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(AuthConfig::Bearer {
            token: token.into(),
        });
        self
    }

    /// Add a single custom HTTP header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_connect_timeout_ms(mut self, timeout: u64) -> Self {
        self.connect_timeout_ms = Some(timeout);
        self
    }

    pub fn with_write_timeout_ms(mut self, timeout: u64) -> Self {
        self.write_timeout_ms = Some(timeout);
        self
    }

    fn validate(&self) -> Result<(), HandlerBuildError> {
        validate_url(self.log_url.as_deref(), "log_url")?;
        validate_url(self.event_url.as_deref(), "event_url")?;
        if let Some(timeout) = self.connect_timeout_ms {
            ensure_positive(timeout, "connect_timeout_ms")?;
        }
        if let Some(timeout) = self.write_timeout_ms {
            ensure_positive(timeout, "write_timeout_ms")?;
        }
        if let Some(AuthConfig::Bearer { token }) = &self.auth
            && token.trim().is_empty()
        {
            return Err(HandlerBuildError::InvalidConfig(
                "bearer token must not be empty".into(),
            ));
        }
        Ok(())
    }

    fn build_config(&self) -> Result<HttpTransmitterConfig, HandlerBuildError> {
        self.validate()?;
        let defaults = HttpTransmitterConfig::default();
        Ok(HttpTransmitterConfig {
            log_url: self.log_url.clone().unwrap_or_default(),
            event_url: self.event_url.clone().unwrap_or_default(),
            auth: self.auth.clone().unwrap_or(defaults.auth),
            headers: self.headers.clone(),
            connect_timeout: self
                .connect_timeout_ms
                .map_or(defaults.connect_timeout, Duration::from_millis),
            write_timeout: self
                .write_timeout_ms
                .map_or(defaults.write_timeout, Duration::from_millis),
        })
    }

    pub fn build(&self) -> Result<HttpTransmitter, HandlerBuildError> {
        Ok(HttpTransmitter::with_config(self.build_config()?))
    }
}

fn validate_url(url: Option<&str>, field: &str) -> Result<(), HandlerBuildError> {
    match url.map(str::trim) {
        None => Err(HandlerBuildError::InvalidConfig(format!(
            "HTTP transmitter requires {field}"
        ))),
        Some("") => Err(HandlerBuildError::InvalidConfig(format!(
            "{field} must not be empty"
        ))),
        Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
            Err(HandlerBuildError::InvalidConfig(format!(
                "{field} must be an http or https URL, got {url:?}"
            )))
        }
        Some(_) => Ok(()),
    }
}
