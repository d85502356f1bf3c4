//! Quarry Location - hierarchical identifiers for datasets and tags
//!
//! A [`Location`] names a node in the metadata hierarchy: either a bare
//! absolute path (`/data/tracking`) or a scheme-qualified URI
//! (`hdfs://namenode:8020/store/data/tracking`).
//!
//! Ancestry and containment compare path representations only, component by
//! component. Scheme and authority take part in identity but not in ancestry.

pub mod error;
pub mod location;

pub use error::{LocationError, Result};
pub use location::Location;
