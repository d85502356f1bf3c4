//! Quarry Finder - tag-driven dataset discovery
//!
//! Decides which dataset locations a job (replication, retention) should
//! process, using a hierarchical tag store.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  Job props   │     │   Gather     │     │    Reduce    │     │ Materialize  │
//! │ (store root, │────▶│ (whitelist / │────▶│ (root scope, │────▶│  (optional   │
//! │  tags, root) │     │  blacklist)  │     │ leaves only) │     │  strategy)   │
//! └──────────────┘     └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! # Core Concepts
//!
//! - **Whitelist tag**: datasets importing it (directly or transitively) are candidates
//! - **Blacklist tags**: datasets importing any of them are never returned
//! - **Common root**: candidates outside it are ignored
//! - **Leaf**: a candidate with no other candidate below it

pub mod config;
pub mod error;
pub mod finder;
pub mod gather;
pub mod metadata;
pub mod reduce;
pub mod store;

// Re-exports for convenience
pub use config::{BlacklistTags, FinderConfig, JobProperties};
pub use error::{FinderError, Result};
pub use finder::{DatasetDescriptor, DatasetFinder, DatasetMaterializer, DescriptorMaterializer};
pub use gather::{gather, Candidates};
pub use metadata::{MetadataError, MetadataQueryService};
pub use reduce::{by_path_length, reduce, reduce_with_ordering, CandidateOrdering};
pub use store::{TagStore, TagStoreClient};

pub use quarry_location::{Location, LocationError};
