//! In-memory tag store
//!
//! A [`TagStore`] is a hierarchy of nodes under a store root. Each node may
//! import tags (other nodes), and implicitly inherits everything its parent
//! imports. [`TagStoreClient`] routes queries to registered stores and
//! implements [`MetadataQueryService`].
//!
//! Store files are TOML:
//!
//! ```toml
//! root = "hdfs://nn:8020/store"
//! version = "v3"
//!
//! [[node]]
//! path = "/data/tracking"
//! imports = ["/tags/replicate"]
//! ```

use crate::metadata::{MetadataError, MetadataQueryService};
use quarry_location::Location;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;

const DEFAULT_STORE_VERSION: &str = "v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    root: String,
    #[serde(default = "default_version")]
    version: String,
    #[serde(default, rename = "node")]
    nodes: Vec<NodeEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeEntry {
    path: String,
    #[serde(default)]
    imports: Vec<String>,
}

fn default_version() -> String {
    DEFAULT_STORE_VERSION.to_string()
}

/// One versioned tag hierarchy.
#[derive(Debug, Clone)]
pub struct TagStore {
    root: Location,
    version: String,
    imports: BTreeMap<Location, Vec<Location>>,
}

impl TagStore {
    pub fn new(root: Location, version: impl Into<String>) -> Self {
        Self {
            root,
            version: version.into(),
            imports: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Location {
        &self.root
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Declare a node (path relative to the store root) and the tags it imports.
    pub fn add_node<I, S>(&mut self, path: &str, imports: I) -> Result<(), MetadataError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let node = self.root.merge(path)?;
        let imports = imports
            .into_iter()
            .map(|tag| self.root.merge(tag.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.imports.entry(node).or_default().extend(imports);
        Ok(())
    }

    /// Builder form of [`TagStore::add_node`].
    pub fn with_node<I, S>(mut self, path: &str, imports: I) -> Result<Self, MetadataError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_node(path, imports)?;
        Ok(self)
    }

    /// Parse a store from TOML text. `source` names the text in errors.
    pub fn from_toml_str(content: &str, source: &str) -> Result<Self, MetadataError> {
        let file: StoreFile = toml::from_str(content).map_err(|e| MetadataError::StoreCreation {
            uri: source.to_string(),
            reason: e.to_string(),
        })?;

        let mut store = TagStore::new(Location::parse(&file.root)?, file.version);
        for node in file.nodes {
            store.add_node(&node.path, &node.imports)?;
        }
        Ok(store)
    }

    /// Load a store from a TOML file
    pub fn load(path: &Path) -> Result<Self, MetadataError> {
        let content = std::fs::read_to_string(path).map_err(|e| MetadataError::StoreCreation {
            uri: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// Declared nodes plus every directory between them and the store root.
    fn nodes(&self) -> BTreeSet<Location> {
        let mut nodes = BTreeSet::new();
        for node in self.imports.keys() {
            let mut current = Some(node.clone());
            while let Some(location) = current {
                if !self.root.is_ancestor_of(&location) || !nodes.insert(location.clone()) {
                    break;
                }
                current = location.parent();
            }
        }
        nodes
    }

    fn imports_directly(&self, node: &Location, tag: &Location) -> bool {
        self.imports
            .get(node)
            .map(|tags| tags.iter().any(|t| t.path() == tag.path()))
            .unwrap_or(false)
    }

    /// Nodes importing `tag`, sorted.
    ///
    /// Without `recursive` only direct importers are returned. With it, a node
    /// counts if it imports `tag`, imports something that does, or lies below
    /// something that does.
    pub fn imported_by(&self, tag: &Location, recursive: bool) -> Vec<Location> {
        let nodes = self.nodes();
        if !recursive {
            return nodes
                .into_iter()
                .filter(|node| self.imports_directly(node, tag))
                .collect();
        }

        let mut found = BTreeSet::new();
        let mut queue = VecDeque::from([tag.clone()]);
        while let Some(target) = queue.pop_front() {
            for node in &nodes {
                if node.path() == tag.path() || found.contains(node) {
                    continue;
                }
                if self.imports_directly(node, &target) || target.is_ancestor_of(node) {
                    found.insert(node.clone());
                    queue.push_back(node.clone());
                }
            }
        }
        found.into_iter().collect()
    }
}

/// Routes tag queries to registered stores.
///
/// A tag is served by the store with the same scheme and authority whose root
/// contains it; the deepest such root wins.
#[derive(Debug, Clone, Default)]
pub struct TagStoreClient {
    stores: Vec<TagStore>,
    version: Option<String>,
}

impl TagStoreClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, store: TagStore) {
        self.stores.push(store);
    }

    pub fn with_store(mut self, store: TagStore) -> Self {
        self.register(store);
        self
    }

    /// Only answer from stores at exactly this version.
    pub fn pin_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn stores(&self) -> &[TagStore] {
        &self.stores
    }

    fn route(&self, tag: &Location) -> Result<&TagStore, MetadataError> {
        let same_scheme: Vec<&TagStore> = self
            .stores
            .iter()
            .filter(|store| store.root.scheme() == tag.scheme())
            .collect();
        if same_scheme.is_empty() {
            return Err(MetadataError::FactoryMissing {
                scheme: tag.scheme().unwrap_or("<none>").to_string(),
            });
        }

        let store = same_scheme
            .into_iter()
            .filter(|store| store.root.authority() == tag.authority() && store.root.contains(tag))
            .max_by_key(|store| store.root.depth())
            .ok_or_else(|| MetadataError::StoreCreation {
                uri: tag.to_string(),
                reason: "no registered store root contains this location".to_string(),
            })?;

        if let Some(version) = &self.version {
            if version != store.version() {
                return Err(MetadataError::VersionUnresolvable {
                    store: store.root.to_string(),
                    version: version.clone(),
                });
            }
        }
        Ok(store)
    }
}

impl MetadataQueryService for TagStoreClient {
    fn imported_by(&self, tag: &Location, recursive: bool) -> Result<Vec<Location>, MetadataError> {
        let store = self.route(tag)?;
        let importers = store.imported_by(tag, recursive);
        tracing::debug!(
            tag = %tag,
            store = %store.root(),
            recursive,
            importers = importers.len(),
            "Resolved tag importers"
        );
        Ok(importers)
    }
}
