//! Candidate gathering
//!
//! One recursive query for the whitelist tag, one per blacklist tag. Nothing
//! is cached between calls.

use crate::config::{BlacklistTags, FinderConfig};
use crate::error::{FinderError, Result};
use crate::metadata::MetadataQueryService;
use quarry_location::Location;
use std::collections::HashSet;
use tracing::{debug, error};

/// Raw discovery input for the leaf reducer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    /// Importers of the whitelist tag, unvalidated.
    pub candidates: Vec<Location>,
    /// Union of the importers of every blacklist tag.
    pub disabled: HashSet<Location>,
}

/// Query the metadata service for whitelist candidates and blacklisted locations.
///
/// The first service failure aborts the whole call.
pub fn gather<S>(service: &S, config: &FinderConfig) -> Result<Candidates>
where
    S: MetadataQueryService + ?Sized,
{
    let candidates = imported_by(service, config.whitelist_tag())?;

    let mut disabled = HashSet::new();
    if let BlacklistTags::Configured(tags) = config.blacklist_tags() {
        for tag in tags {
            disabled.extend(imported_by(service, tag)?);
        }
    }

    debug!(
        whitelist = %config.whitelist_tag(),
        candidates = candidates.len(),
        disabled = disabled.len(),
        "Gathered candidate datasets"
    );
    Ok(Candidates {
        candidates,
        disabled,
    })
}

fn imported_by<S>(service: &S, tag: &Location) -> Result<Vec<Location>>
where
    S: MetadataQueryService + ?Sized,
{
    service.imported_by(tag, true).map_err(|source| {
        error!(tag = %tag, error = %source, "Failed to resolve tag importers");
        FinderError::Metadata {
            tag: tag.clone(),
            source,
        }
    })
}
