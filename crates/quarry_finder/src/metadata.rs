//! Metadata query interface
//!
//! The finder never talks to a concrete metadata store. It is handed a
//! [`MetadataQueryService`] at construction and asks it which locations import
//! a tag.

use quarry_location::{Location, LocationError};
use std::sync::Arc;
use thiserror::Error;

/// Errors reported by a metadata service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("No store factory registered for scheme '{scheme}'")]
    FactoryMissing { scheme: String },

    #[error("Failed to create store for '{uri}': {reason}")]
    StoreCreation { uri: String, reason: String },

    #[error("Store '{store}' cannot resolve version '{version}'")]
    VersionUnresolvable { store: String, version: String },

    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(#[from] LocationError),
}

/// Answers "which locations import this tag?".
///
/// Implementations block until the answer is available. A finder is safe to
/// share across threads only if its service is.
pub trait MetadataQueryService {
    /// Locations importing `tag`. With `recursive`, importers are followed
    /// transitively and inherited through the hierarchy.
    fn imported_by(&self, tag: &Location, recursive: bool) -> Result<Vec<Location>, MetadataError>;
}

impl<T: MetadataQueryService + ?Sized> MetadataQueryService for &T {
    fn imported_by(&self, tag: &Location, recursive: bool) -> Result<Vec<Location>, MetadataError> {
        (**self).imported_by(tag, recursive)
    }
}

impl<T: MetadataQueryService + ?Sized> MetadataQueryService for Box<T> {
    fn imported_by(&self, tag: &Location, recursive: bool) -> Result<Vec<Location>, MetadataError> {
        (**self).imported_by(tag, recursive)
    }
}

impl<T: MetadataQueryService + ?Sized> MetadataQueryService for Arc<T> {
    fn imported_by(&self, tag: &Location, recursive: bool) -> Result<Vec<Location>, MetadataError> {
        (**self).imported_by(tag, recursive)
    }
}
