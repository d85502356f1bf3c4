use crate::error::{LocationError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;

/// A hierarchical location: an optional `scheme://authority` prefix plus a path.
///
/// Identity is the normalized identifier string. Ordering is path-comparison
/// order (segment by segment), so every descendant of a location sorts directly
/// after it, before any sibling that sorts after it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location {
    raw: String,
    scheme: Option<String>,
    authority: Option<String>,
    path: String,
}

impl Location {
    /// Parse a location from either a bare absolute path (`/data/a`) or a
    /// scheme-qualified URI (`hdfs://nn:8020/data/a`).
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() {
            return Err(LocationError::Empty);
        }
        if input.starts_with('/') {
            return Ok(Self::from_parts(None, None, input));
        }

        let url = match Url::parse(input) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                return Err(LocationError::Relative(input.to_string()));
            }
            Err(e) => return Err(LocationError::malformed(input, e.to_string())),
        };

        if url.cannot_be_a_base() {
            return Err(LocationError::malformed(input, "not a hierarchical URI"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(LocationError::malformed(
                input,
                "query and fragment components are not allowed",
            ));
        }

        Ok(Self::from_parts(
            Some(url.scheme().to_string()),
            authority_of(&url),
            literal_path(input),
        ))
    }

    fn from_parts(scheme: Option<String>, authority: Option<String>, path: &str) -> Self {
        let path = normalize_path(path);
        let raw = match &scheme {
            Some(scheme) => format!(
                "{}://{}{}",
                scheme,
                authority.as_deref().unwrap_or_default(),
                path
            ),
            None => path.clone(),
        };
        Self {
            raw,
            scheme,
            authority,
            path,
        }
    }

    /// The full normalized identifier.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The path representation, always starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// Path components, root first.
    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.path.split('/').filter(|s| !s.is_empty())
    }

    /// Number of path components (`/` has depth 0).
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// True if `self` is a strict ancestor of `other`.
    ///
    /// Only path representations are compared; scheme and authority are ignored.
    pub fn is_ancestor_of(&self, other: &Location) -> bool {
        let mut mine = self.segments();
        let mut theirs = other.segments();
        loop {
            match (mine.next(), theirs.next()) {
                (None, Some(_)) => return true,
                (Some(a), Some(b)) if a == b => continue,
                _ => return false,
            }
        }
    }

    /// True if `other` is `self` or lies below it (path representations only).
    pub fn contains(&self, other: &Location) -> bool {
        self.is_ancestor_of(other) || self.segments().eq(other.segments())
    }

    /// Append `relative` below this location, keeping scheme and authority.
    ///
    /// A leading `/` on `relative` is optional. If `relative` is itself a
    /// scheme-qualified location only its path is used.
    pub fn merge(&self, relative: &str) -> Result<Location> {
        let relative_path = match Location::parse(relative) {
            Ok(location) => location.path,
            Err(LocationError::Empty) => return Ok(self.clone()),
            Err(LocationError::Relative(_)) => relative.to_string(),
            Err(e) => return Err(e),
        };

        let joined = format!("{}/{}", self.path, relative_path);
        Ok(Self::from_parts(
            self.scheme.clone(),
            self.authority.clone(),
            &joined,
        ))
    }

    /// The path of `self` below `root`, without a leading `/`.
    ///
    /// Returns `None` if `self` is not contained in `root`, and an empty string
    /// if both are the same path.
    pub fn relative_to(&self, root: &Location) -> Option<String> {
        if !root.contains(self) {
            return None;
        }
        let skip = root.depth();
        Some(self.segments().skip(skip).collect::<Vec<_>>().join("/"))
    }

    /// The immediate parent, or `None` at `/`.
    pub fn parent(&self) -> Option<Location> {
        let depth = self.depth();
        if depth == 0 {
            return None;
        }
        let parent_path = self
            .segments()
            .take(depth - 1)
            .collect::<Vec<_>>()
            .join("/");
        Some(Self::from_parts(
            self.scheme.clone(),
            self.authority.clone(),
            &format!("/{}", parent_path),
        ))
    }
}

fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// The path of a URI exactly as written. `Url` resolves `.` and `..`
/// segments, which locations keep verbatim.
fn literal_path(input: &str) -> &str {
    let rest = input.split_once(':').map_or(input, |(_, rest)| rest);
    match rest.strip_prefix("//") {
        Some(hierarchy) => hierarchy.find('/').map_or("", |start| &hierarchy[start..]),
        None => rest,
    }
}

fn authority_of(url: &Url) -> Option<String> {
    let host = url.host_str().filter(|h| !h.is_empty())?;
    let mut authority = String::new();
    if !url.username().is_empty() {
        authority.push_str(url.username());
        if let Some(password) = url.password() {
            authority.push(':');
            authority.push_str(password);
        }
        authority.push('@');
    }
    authority.push_str(host);
    if let Some(port) = url.port() {
        authority.push_str(&format!(":{}", port));
    }
    Some(authority)
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments()
            .cmp(other.segments())
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl std::str::FromStr for Location {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Location {
    type Error = LocationError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Location> for String {
    fn from(value: Location) -> Self {
        value.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    #[test]
    fn parses_bare_paths_and_normalizes_slashes() {
        let location = loc("/data//tracking/");
        assert_eq!(location.as_str(), "/data/tracking");
        assert_eq!(location.path(), "/data/tracking");
        assert_eq!(location.scheme(), None);
        assert_eq!(loc("/").as_str(), "/");
        assert_eq!(loc("///").depth(), 0);
    }

    #[test]
    fn parses_scheme_and_authority() {
        let location = loc("hdfs://namenode:8020/store//tags/");
        assert_eq!(location.scheme(), Some("hdfs"));
        assert_eq!(location.authority(), Some("namenode:8020"));
        assert_eq!(location.path(), "/store/tags");
        assert_eq!(location.as_str(), "hdfs://namenode:8020/store/tags");
    }

    #[test]
    fn file_uri_has_no_authority() {
        let location = loc("file:///srv/store");
        assert_eq!(location.authority(), None);
        assert_eq!(location.as_str(), "file:///srv/store");
    }

    #[test]
    fn rejects_empty_relative_and_opaque() {
        assert_eq!(Location::parse(""), Err(LocationError::Empty));
        assert!(matches!(
            Location::parse("data/a"),
            Err(LocationError::Relative(_))
        ));
        assert!(matches!(
            Location::parse("mailto:ops@example.com"),
            Err(LocationError::Malformed { .. })
        ));
        assert!(matches!(
            Location::parse("hdfs://nn/a?x=1"),
            Err(LocationError::Malformed { .. })
        ));
    }

    #[test]
    fn ancestry_is_strict_and_component_wise() {
        let root = loc("/root");
        assert!(root.is_ancestor_of(&loc("/root/a")));
        assert!(root.is_ancestor_of(&loc("/root/a/b")));
        assert!(!root.is_ancestor_of(&loc("/root")));
        assert!(!root.is_ancestor_of(&loc("/rootx/a")));
        assert!(!loc("/root/a").is_ancestor_of(&root));
        assert!(loc("/").is_ancestor_of(&root));
    }

    #[test]
    fn ancestry_ignores_scheme_and_authority() {
        assert!(loc("/store/data").is_ancestor_of(&loc("hdfs://nn/store/data/a")));
        assert!(loc("hdfs://nn/store").contains(&loc("file:///store")));
    }

    #[test]
    fn contains_is_descendant_or_equal() {
        let root = loc("/root");
        assert!(root.contains(&loc("/root")));
        assert!(root.contains(&loc("/root/x")));
        assert!(!root.contains(&loc("/other/x")));
    }

    #[test]
    fn merge_keeps_scheme_and_authority() {
        let store = loc("hdfs://nn:8020/store");
        assert_eq!(
            store.merge("/data/tracking").unwrap().as_str(),
            "hdfs://nn:8020/store/data/tracking"
        );
        assert_eq!(
            store.merge("tags/replicate").unwrap().as_str(),
            "hdfs://nn:8020/store/tags/replicate"
        );
        assert_eq!(store.merge("").unwrap(), store);
    }

    #[test]
    fn merge_uses_only_the_path_of_a_qualified_relative() {
        let store = loc("/store");
        assert_eq!(
            store.merge("hdfs://other/tags/x").unwrap().as_str(),
            "/store/tags/x"
        );
    }

    #[test]
    fn dot_segments_are_kept_verbatim() {
        let bare = loc("/store").merge("../x").unwrap();
        let qualified = loc("hdfs://nn/store").merge("../x").unwrap();
        assert_eq!(bare.path(), "/store/../x");
        assert_eq!(qualified.path(), "/store/../x");
        assert_eq!(qualified.as_str(), "hdfs://nn/store/../x");

        let parsed = loc("hdfs://nn:8020/store/./tags/../x");
        assert_eq!(parsed.path(), "/store/./tags/../x");
        assert_eq!(parsed.authority(), Some("nn:8020"));
        assert_eq!(loc("file:///srv/../store").path(), "/srv/../store");
        assert_eq!(loc("hdfs://nn").path(), "/");
    }

    #[test]
    fn path_order_keeps_descendants_adjacent() {
        let mut locations = vec![loc("/r/a-x"), loc("/r/a/b"), loc("/r/a"), loc("/r/a.b")];
        locations.sort();
        let ordered: Vec<&str> = locations.iter().map(Location::as_str).collect();
        assert_eq!(ordered, vec!["/r/a", "/r/a/b", "/r/a-x", "/r/a.b"]);
    }

    #[test]
    fn relative_to_and_parent() {
        let root = loc("hdfs://nn/store/data");
        let leaf = loc("hdfs://nn/store/data/a/b");
        assert_eq!(leaf.relative_to(&root).as_deref(), Some("a/b"));
        assert_eq!(root.relative_to(&root).as_deref(), Some(""));
        assert_eq!(root.relative_to(&leaf), None);
        assert_eq!(leaf.parent().unwrap().as_str(), "hdfs://nn/store/data/a");
        assert_eq!(loc("/a").parent().unwrap().as_str(), "/");
        assert_eq!(loc("/").parent(), None);
    }

    #[test]
    fn serde_uses_the_identifier_string() {
        let location = loc("hdfs://nn/store/a");
        let json = serde_json::to_string(&location).unwrap();
        assert_eq!(json, "\"hdfs://nn/store/a\"");
        let parsed: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, location);
        assert!(serde_json::from_str::<Location>("\"relative/path\"").is_err());
    }
}
