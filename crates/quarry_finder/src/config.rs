//! Job configuration for dataset discovery
//!
//! Jobs are described by flat string properties. TOML job files are flattened
//! into dotted keys, so these two files are equivalent:
//!
//! ```toml
//! quarry.store.uri = "hdfs://nn/store"
//! ```
//!
//! ```toml
//! [quarry.store]
//! uri = "hdfs://nn/store"
//! ```

use crate::error::{FinderError, Result};
use quarry_location::Location;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Base location of the metadata hierarchy.
pub const STORE_URI_KEY: &str = "quarry.store.uri";

/// Store version to pin queries to.
pub const STORE_VERSION_KEY: &str = "quarry.store.version";

/// Tag (relative to the store root) whose importers are processed.
pub const WHITELIST_TAG_KEY: &str = "quarry.finder.whitelist.tag";

/// Comma-separated tags (relative to the store root) whose importers are never
/// processed. Blacklist overrides whitelist.
pub const BLACKLIST_TAGS_KEY: &str = "quarry.finder.blacklist.tags";

/// Path (relative to the store root) that every processed dataset lies under.
pub const COMMON_ROOT_KEY: &str = "quarry.finder.dataset.common.root";

/// Flat key/value job properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobProperties(BTreeMap<String, String>);

impl JobProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse job properties from TOML text, flattening nested tables.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table = content
            .parse::<toml::Table>()
            .map_err(|e| FinderError::Config(e.to_string()))?;
        let mut props = BTreeMap::new();
        flatten_table("", &table, &mut props)?;
        Ok(Self(props))
    }

    /// Load job properties from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

fn flatten_table(
    prefix: &str,
    table: &toml::Table,
    out: &mut BTreeMap<String, String>,
) -> Result<()> {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            toml::Value::Table(nested) => flatten_table(&full_key, nested, out)?,
            toml::Value::Array(items) => {
                let rendered = items
                    .iter()
                    .map(|item| scalar_to_string(&full_key, item))
                    .collect::<Result<Vec<_>>>()?;
                out.insert(full_key, rendered.join(","));
            }
            scalar => {
                let rendered = scalar_to_string(&full_key, scalar)?;
                out.insert(full_key, rendered);
            }
        }
    }
    Ok(())
}

fn scalar_to_string(key: &str, value: &toml::Value) -> Result<String> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Datetime(d) => Ok(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => Err(FinderError::Config(format!(
            "Config entry '{}' must be a scalar or a list of scalars",
            key
        ))),
    }
}

/// Blacklist tags, keeping "not configured" apart from "configured but empty".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlacklistTags {
    NotConfigured,
    Configured(Vec<Location>),
}

impl BlacklistTags {
    pub fn is_configured(&self) -> bool {
        matches!(self, BlacklistTags::Configured(_))
    }

    /// Configured tags, or an empty slice.
    pub fn tags(&self) -> &[Location] {
        match self {
            BlacklistTags::NotConfigured => &[],
            BlacklistTags::Configured(tags) => tags,
        }
    }
}

/// Structural locations resolved from job properties.
///
/// Built once by [`FinderConfig::resolve`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct FinderConfig {
    store_root: Location,
    common_root: Location,
    whitelist_tag: Location,
    blacklist_tags: BlacklistTags,
    props: JobProperties,
}

impl FinderConfig {
    /// Resolve the store root, common root and tags from job properties.
    ///
    /// Fails on the first missing required entry, checked in the order store
    /// URI, whitelist tag, common root.
    pub fn resolve(props: JobProperties) -> Result<Self> {
        let store_uri = required(&props, STORE_URI_KEY)?;
        let whitelist = required(&props, WHITELIST_TAG_KEY)?;
        let common = required(&props, COMMON_ROOT_KEY)?;

        let store_root = Location::parse(store_uri).map_err(|source| {
            FinderError::InvalidLocation {
                key: STORE_URI_KEY.to_string(),
                source,
            }
        })?;
        let common_root = merge(&store_root, COMMON_ROOT_KEY, common)?;
        let whitelist_tag = merge(&store_root, WHITELIST_TAG_KEY, whitelist)?;

        let blacklist_tags = match props.get(BLACKLIST_TAGS_KEY) {
            Some(value) => BlacklistTags::Configured(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| merge(&store_root, BLACKLIST_TAGS_KEY, s))
                    .collect::<Result<Vec<_>>>()?,
            ),
            None => BlacklistTags::NotConfigured,
        };

        Ok(Self {
            store_root,
            common_root,
            whitelist_tag,
            blacklist_tags,
            props,
        })
    }

    pub fn store_root(&self) -> &Location {
        &self.store_root
    }

    pub fn common_root(&self) -> &Location {
        &self.common_root
    }

    pub fn whitelist_tag(&self) -> &Location {
        &self.whitelist_tag
    }

    pub fn blacklist_tags(&self) -> &BlacklistTags {
        &self.blacklist_tags
    }

    pub fn store_version(&self) -> Option<&str> {
        self.props.get(STORE_VERSION_KEY)
    }

    /// The job properties this config was resolved from.
    pub fn props(&self) -> &JobProperties {
        &self.props
    }
}

fn required<'a>(props: &'a JobProperties, key: &str) -> Result<&'a str> {
    props.get(key).ok_or_else(|| FinderError::missing_config(key))
}

fn merge(root: &Location, key: &str, relative: &str) -> Result<Location> {
    root.merge(relative)
        .map_err(|source| FinderError::InvalidLocation {
            key: key.to_string(),
            source,
        })
}
