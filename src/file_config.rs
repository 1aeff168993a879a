//! INI configuration for the cloud handler.
//!
//! Settings live in a `[cloud]` section and an optional `[cloud.http]`
//! section:
//!
//! ```ini
//! [cloud]
//! min_level = Warning
//! documents_dir = /data/documents
//! capacity = 256
//! flush_timeout_ms = 2000
//! overflow_policy = timeout
//! overflow_timeout_ms = 50
//!
//! [cloud.http]
//! log_url = https://cloud.example/api/logs
//! event_url = https://cloud.example/api/events
//! bearer_token = secret
//! header.X-Device-Id = sensor-7
//! ```
//!
//! Parsing only populates builders; validation happens when they build.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use ini::{Ini, Properties};
use thiserror::Error;

use crate::cloud_handler::{Connectivity, OverflowPolicy};
use crate::handlers::{CloudHandlerBuilder, HandlerBuildError, HttpTransmitterBuilder};
use crate::level::FemtoLevel;

const CLOUD_SECTION: &str = "cloud";
const HTTP_SECTION: &str = "cloud.http";
const HEADER_PREFIX: &str = "header.";

/// Errors raised while loading an INI configuration.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("{path} doesn't exist")]
    NotFound { path: String },
    #[error("failed to read {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("{path} is an empty file")]
    Empty { path: String },
    #[error("{path} is invalid: {message}")]
    Parse { path: String, message: String },
    #[error("missing [{0}] section")]
    MissingSection(&'static str),
    #[error("unknown key {key:?} in [{section}]")]
    UnknownKey { section: &'static str, key: String },
    #[error("invalid value {value:?} for {key} in [{section}]: {reason}")]
    InvalidValue {
        section: &'static str,
        key: String,
        value: String,
        reason: String,
    },
}

/// Builders populated from an INI file.
#[derive(Debug)]
pub struct CloudFileConfig {
    pub cloud: CloudHandlerBuilder,
    pub http: Option<HttpTransmitterBuilder>,
}

impl CloudFileConfig {
    /// Complete the cloud builder with `connectivity` and an HTTP
    /// transmitter built from `[cloud.http]`.
    pub fn into_handler_builder(
        self,
        connectivity: Arc<dyn Connectivity>,
    ) -> Result<CloudHandlerBuilder, HandlerBuildError> {
        let Some(http) = self.http else {
            return Err(HandlerBuildError::InvalidConfig(format!(
                "missing [{HTTP_SECTION}] section"
            )));
        };
        let transmitter = http.build()?;
        Ok(self
            .cloud
            .with_connectivity(connectivity)
            .with_transmitter(Arc::new(transmitter)))
    }
}

/// Load the cloud configuration from the INI file at `path`.
pub fn load_cloud_config(path: impl AsRef<Path>) -> Result<CloudFileConfig, ConfigFileError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(ConfigFileError::NotFound { path: display });
        }
        Err(source) => {
            return Err(ConfigFileError::Io {
                path: display,
                source,
            });
        }
    };
    if text.trim().is_empty() {
        return Err(ConfigFileError::Empty { path: display });
    }
    parse_with_path(&display, &text)
}

/// Parse the cloud configuration from INI text.
pub fn parse_cloud_config(text: &str) -> Result<CloudFileConfig, ConfigFileError> {
    parse_with_path("<string>", text)
}

fn parse_with_path(path: &str, text: &str) -> Result<CloudFileConfig, ConfigFileError> {
    let ini = Ini::load_from_str(text).map_err(|err| ConfigFileError::Parse {
        path: path.to_owned(),
        message: err.to_string(),
    })?;
    let cloud = ini
        .section(Some(CLOUD_SECTION))
        .ok_or(ConfigFileError::MissingSection(CLOUD_SECTION))?;
    Ok(CloudFileConfig {
        cloud: cloud_builder(cloud)?,
        http: ini.section(Some(HTTP_SECTION)).map(http_builder).transpose()?,
    })
}

fn invalid(
    section: &'static str,
    key: &str,
    value: &str,
    reason: impl ToString,
) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section,
        key: key.to_owned(),
        value: value.to_owned(),
        reason: reason.to_string(),
    }
}

fn parse_value<T>(section: &'static str, key: &str, value: &str) -> Result<T, ConfigFileError>
where
    T: FromStr,
    T::Err: ToString,
{
    value
        .trim()
        .parse()
        .map_err(|err: T::Err| invalid(section, key, value, err))
}

fn cloud_builder(props: &Properties) -> Result<CloudHandlerBuilder, ConfigFileError> {
    const S: &str = CLOUD_SECTION;
    let mut builder = CloudHandlerBuilder::new();
    let mut log_file = None;
    let mut event_file = None;
    let mut overflow = None;
    let mut overflow_timeout_ms = None;

    for (key, value) in props.iter() {
        builder = match key {
            "min_level" => builder.with_min_level(parse_value::<FemtoLevel>(S, key, value)?),
            "documents_dir" => builder.with_documents_dir(value.trim()),
            "capacity" => builder.with_capacity(parse_value(S, key, value)?),
            "flush_timeout_ms" => builder.with_flush_timeout_ms(parse_value(S, key, value)?),
            "log_file" => {
                log_file = Some(value.trim().to_owned());
                builder
            }
            "event_file" => {
                event_file = Some(value.trim().to_owned());
                builder
            }
            "overflow_policy" => {
                overflow = Some(value.trim().to_ascii_lowercase());
                builder
            }
            "overflow_timeout_ms" => {
                overflow_timeout_ms = Some(parse_value::<u64>(S, key, value)?);
                builder
            }
            other => {
                return Err(ConfigFileError::UnknownKey {
                    section: S,
                    key: other.to_owned(),
                });
            }
        };
    }

    match (log_file, event_file) {
        (None, None) => {}
        (log, event) => {
            builder = builder.with_backlog_file_names(
                log.unwrap_or_else(|| crate::cloud_handler::DEFAULT_LOG_BACKLOG.to_owned()),
                event.unwrap_or_else(|| crate::cloud_handler::DEFAULT_EVENT_BACKLOG.to_owned()),
            );
        }
    }

    if let Some(policy) = overflow {
        let policy = match (policy.as_str(), overflow_timeout_ms) {
            ("drop", _) => OverflowPolicy::Drop,
            ("block", _) => OverflowPolicy::Block,
            ("timeout", Some(ms)) => OverflowPolicy::Timeout(Duration::from_millis(ms)),
            ("timeout", None) => {
                return Err(invalid(
                    S,
                    "overflow_policy",
                    &policy,
                    "timeout requires overflow_timeout_ms",
                ));
            }
            _ => {
                return Err(invalid(
                    S,
                    "overflow_policy",
                    &policy,
                    "expected drop, block or timeout",
                ));
            }
        };
        builder = builder.with_overflow_policy(policy);
    }
    Ok(builder)
}

fn http_builder(props: &Properties) -> Result<HttpTransmitterBuilder, ConfigFileError> {
    const S: &str = HTTP_SECTION;
    let mut builder = HttpTransmitterBuilder::new();
    let mut username = None;
    let mut password = None;

    for (key, value) in props.iter() {
        let value = value.trim();
        builder = match key {
            "log_url" => builder.with_log_url(value),
            "event_url" => builder.with_event_url(value),
            "bearer_token" => builder.with_bearer_token(value),
            "basic_username" => {
                username = Some(value.to_owned());
                builder
            }
            "basic_password" => {
                password = Some(value.to_owned());
                builder
            }
            "connect_timeout_ms" => builder.with_connect_timeout_ms(parse_value(S, key, value)?),
            "write_timeout_ms" => builder.with_write_timeout_ms(parse_value(S, key, value)?),
            other => match other.strip_prefix(HEADER_PREFIX) {
                Some(name) if !name.is_empty() => builder.with_header(name, value),
                _ => {
                    return Err(ConfigFileError::UnknownKey {
                        section: S,
                        key: other.to_owned(),
                    });
                }
            },
        };
    }

    match (username, password) {
        (None, None) => {}
        (Some(user), Some(pass)) => builder = builder.with_basic_auth(user, pass),
        (Some(_), None) => {
            return Err(invalid(S, "basic_username", "", "basic_password is also required"));
        }
        (None, Some(_)) => {
            return Err(invalid(S, "basic_password", "", "basic_username is also required"));
        }
    }
    Ok(builder)
}
