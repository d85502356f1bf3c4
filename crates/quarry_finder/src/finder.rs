//! Dataset finder
//!
//! [`DatasetFinder`] ties the pieces together: resolved config, an injected
//! metadata service, gathering and leaf reduction. Turning a location into a
//! domain dataset is delegated to a [`DatasetMaterializer`].

use crate::config::{FinderConfig, JobProperties};
use crate::error::{FinderError, Result};
use crate::gather::{gather, Candidates};
use crate::metadata::MetadataQueryService;
use crate::reduce::reduce;
use quarry_location::Location;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info;

/// Turns a discovered location into a dataset object.
pub trait DatasetMaterializer {
    type Dataset;

    fn materialize(&self, location: &Location, config: &FinderConfig) -> Result<Self::Dataset>;
}

impl<F, D> DatasetMaterializer for F
where
    F: Fn(&Location, &FinderConfig) -> Result<D>,
{
    type Dataset = D;

    fn materialize(&self, location: &Location, config: &FinderConfig) -> Result<D> {
        self(location, config)
    }
}

/// Minimal dataset description used by tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetDescriptor {
    pub location: Location,
    /// Path below the common dataset root.
    pub relative_path: String,
}

/// Produces [`DatasetDescriptor`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorMaterializer;

impl DatasetMaterializer for DescriptorMaterializer {
    type Dataset = DatasetDescriptor;

    fn materialize(&self, location: &Location, config: &FinderConfig) -> Result<DatasetDescriptor> {
        let relative_path = location
            .relative_to(config.common_root())
            .ok_or_else(|| FinderError::materialize(location, "not under the common dataset root"))?;
        Ok(DatasetDescriptor {
            location: location.clone(),
            relative_path,
        })
    }
}

/// Finds the datasets a job should process.
///
/// Holds no mutable state; every call re-queries the metadata service.
#[derive(Debug)]
pub struct DatasetFinder<S> {
    service: S,
    config: FinderConfig,
}

impl<S: MetadataQueryService> DatasetFinder<S> {
    /// Resolve `props` and build a finder. Fails fast on missing config.
    pub fn new(service: S, props: JobProperties) -> Result<Self> {
        let config = FinderConfig::resolve(props)?;
        Ok(Self::with_config(service, config))
    }

    pub fn with_config(service: S, config: FinderConfig) -> Self {
        info!(
            store = %config.store_root(),
            common_root = %config.common_root(),
            whitelist = %config.whitelist_tag(),
            blacklist = config.blacklist_tags().tags().len(),
            "Created dataset finder"
        );
        Self { service, config }
    }

    /// Root that every discovered dataset lies under.
    pub fn common_dataset_root(&self) -> &Location {
        self.config.common_root()
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Leaf locations importing the whitelist tag, under the common root, and
    /// not importing any blacklist tag.
    pub fn find_valid_dataset_locations(&self) -> Result<BTreeSet<Location>> {
        let Candidates {
            candidates,
            disabled,
        } = gather(&self.service, &self.config)?;
        let leaves = reduce(&candidates, &disabled, self.config.common_root());
        info!(
            common_root = %self.config.common_root(),
            candidates = candidates.len(),
            datasets = leaves.len(),
            "Found valid dataset locations"
        );
        Ok(leaves)
    }

    /// Materialize every valid location. Any failure aborts the call.
    pub fn find_datasets<M>(&self, materializer: &M) -> Result<Vec<M::Dataset>>
    where
        M: DatasetMaterializer + ?Sized,
    {
        self.find_valid_dataset_locations()?
            .iter()
            .map(|location| materializer.materialize(location, &self.config))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{COMMON_ROOT_KEY, STORE_URI_KEY, WHITELIST_TAG_KEY};
    use crate::store::{TagStore, TagStoreClient};

    fn props() -> JobProperties {
        JobProperties::from_pairs([
            (STORE_URI_KEY, "/store"),
            (WHITELIST_TAG_KEY, "/tags/replicate"),
            (COMMON_ROOT_KEY, "/data"),
        ])
    }

    fn client() -> TagStoreClient {
        let store = TagStore::new(Location::parse("/store").unwrap(), "v1")
            .with_node("/data/a", ["/tags/replicate"])
            .unwrap()
            .with_node("/data/a/hourly", Vec::<&str>::new())
            .unwrap()
            .with_node("/data/b", ["/tags/replicate"])
            .unwrap();
        TagStoreClient::new().with_store(store)
    }

    #[test]
    fn test_common_dataset_root() {
        let finder = DatasetFinder::new(client(), props()).unwrap();
        assert_eq!(finder.common_dataset_root().as_str(), "/store/data");
    }

    #[test]
    fn test_descriptor_materializer() {
        let finder = DatasetFinder::new(client(), props()).unwrap();
        let datasets = finder.find_datasets(&DescriptorMaterializer).unwrap();
        let relative: Vec<&str> = datasets.iter().map(|d| d.relative_path.as_str()).collect();
        assert_eq!(relative, vec!["a/hourly", "b"]);
    }

    #[test]
    fn test_closure_materializer_failure_aborts() {
        let finder = DatasetFinder::new(client(), props()).unwrap();
        let result = finder.find_datasets(&|location: &Location, _: &FinderConfig| {
            if location.path().ends_with("/b") {
                Err(FinderError::materialize(location, "unsupported layout"))
            } else {
                Ok(location.depth())
            }
        });
        assert!(matches!(result, Err(FinderError::Materialize { .. })));
    }

    #[test]
    fn test_descriptor_rejects_outside_root() {
        let config = FinderConfig::resolve(props()).unwrap();
        let err = DescriptorMaterializer
            .materialize(&Location::parse("/elsewhere").unwrap(), &config)
            .unwrap_err();
        assert!(matches!(err, FinderError::Materialize { .. }));
    }
}
