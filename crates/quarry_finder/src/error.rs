//! Error types for dataset discovery.

use crate::metadata::MetadataError;
use quarry_location::{Location, LocationError};
use thiserror::Error;

/// Discovery result type.
pub type Result<T> = std::result::Result<T, FinderError>;

/// Discovery errors. Every variant aborts the call that produced it.
#[derive(Error, Debug)]
pub enum FinderError {
    /// A required job configuration entry is absent
    #[error("Missing required config entry '{key}'")]
    MissingConfig { key: String },

    /// A configured path or URI could not be parsed
    #[error("Invalid location in config entry '{key}': {source}")]
    InvalidLocation {
        key: String,
        #[source]
        source: LocationError,
    },

    /// Job file could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    /// IO error (reading job files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The metadata service failed while resolving a tag
    #[error("Failed to get datasets importing tag '{tag}': {source}")]
    Metadata {
        tag: Location,
        #[source]
        source: MetadataError,
    },

    /// A discovered location could not be turned into a dataset
    #[error("Failed to materialize dataset '{location}': {reason}")]
    Materialize { location: Location, reason: String },
}

impl FinderError {
    /// Create a missing config error.
    pub fn missing_config(key: impl Into<String>) -> Self {
        Self::MissingConfig { key: key.into() }
    }

    /// Create a materialization error.
    pub fn materialize(location: &Location, reason: impl Into<String>) -> Self {
        Self::Materialize {
            location: location.clone(),
            reason: reason.into(),
        }
    }
}
