//! Handler builders and associated traits.
//!
//! Builders validate user supplied settings before any thread is spawned
//! or file is created. Each implements [`HandlerBuilderTrait`].

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::handler::FemtoHandlerTrait;
use crate::level::FemtoLevel;

pub mod cloud_builder;
pub mod http_builder;

pub use cloud_builder::CloudHandlerBuilder;
pub use http_builder::HttpTransmitterBuilder;

/// Errors that may occur while building a handler.
#[derive(Debug, Error)]
pub enum HandlerBuildError {
    /// Invalid user supplied configuration.
    #[error("invalid handler configuration: {0}")]
    InvalidConfig(String),
    /// The requested minimum level is below what the handler allows.
    #[error("minimum level {requested} is below the {floor} floor")]
    SeverityBelowFloor {
        requested: FemtoLevel,
        floor: FemtoLevel,
    },
    /// Underlying I/O error whilst creating the handler.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Trait implemented by all handler builders.
pub trait HandlerBuilderTrait: Send + Sync {
    type Handler: FemtoHandlerTrait + 'static;

    /// Build the concrete handler.
    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError>;

    /// Build the handler ready for registration with a logger.
    fn build(&self) -> Result<Arc<dyn FemtoHandlerTrait>, HandlerBuildError> {
        Ok(Arc::new(self.build_inner()?))
    }
}

/// Reject zero for settings that must be positive.
pub(crate) fn ensure_positive<T: PartialEq + Default>(
    value: T,
    field: &str,
) -> Result<T, HandlerBuildError> {
    if value == T::default() {
        Err(HandlerBuildError::InvalidConfig(format!(
            "{field} must be greater than zero"
        )))
    } else {
        Ok(value)
    }
}
