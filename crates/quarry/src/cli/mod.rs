//! CLI module for Quarry
//!
//! Each command loads a job file, resolves it into a finder config and
//! prints the result as a table or as JSON.

pub mod error;
pub mod output;

pub mod find;
pub mod root;
pub mod tags;

use error::HelpfulError;
use quarry_finder::{FinderConfig, JobProperties, TagStore, TagStoreClient};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load and resolve a job file.
pub fn load_job(path: &Path) -> anyhow::Result<FinderConfig> {
    let props =
        JobProperties::load(path).map_err(|e| HelpfulError::cannot_read_job(path, &e))?;
    debug!(job = %path.display(), entries = props.len(), "Loaded job properties");
    let config = FinderConfig::resolve(props).map_err(|e| HelpfulError::invalid_job(path, &e))?;
    Ok(config)
}

/// Load every store file into one client, pinned to `version` if set.
pub fn load_client(stores: &[PathBuf], version: Option<&str>) -> anyhow::Result<TagStoreClient> {
    let mut client = TagStoreClient::new();
    for path in stores {
        let store = TagStore::load(path).map_err(|e| HelpfulError::cannot_load_store(path, &e))?;
        debug!(
            store = %path.display(),
            root = %store.root(),
            version = store.version(),
            "Loaded tag store"
        );
        client.register(store);
    }
    Ok(match version {
        Some(version) => client.pin_version(version),
        None => client,
    })
}
