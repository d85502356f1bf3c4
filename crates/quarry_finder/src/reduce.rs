//! Leaf reduction
//!
//! Turns the raw importers of the whitelist tag into the set of datasets to
//! process: only candidates under the common root, only the most specific
//! ones (a candidate with another candidate below it is dropped), and never a
//! blacklisted one.
//!
//! Candidates are visited shallow-first and inserted into a path-ordered set.
//! When a candidate arrives, the greatest accepted location not after it (its
//! floor) is the only one that can be its nearest accepted ancestor; if it is
//! an ancestor it is marked non-leaf.

use quarry_location::Location;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};

/// Order in which candidates are visited.
pub type CandidateOrdering = fn(&Location, &Location) -> Ordering;

/// Shorter path representation first.
///
/// Stands in for "ancestors before descendants": a strict ancestor's path is
/// textually shorter than its descendant's for normalized paths. Length is not
/// depth, so unrelated locations interleave freely; only the ancestor-first
/// property matters to [`reduce`].
pub fn by_path_length(a: &Location, b: &Location) -> Ordering {
    a.path().len().cmp(&b.path().len())
}

/// Reduce candidates to leaf datasets under `common_root`, minus `disabled`.
pub fn reduce(
    candidates: &[Location],
    disabled: &HashSet<Location>,
    common_root: &Location,
) -> BTreeSet<Location> {
    reduce_with_ordering(candidates, disabled, common_root, by_path_length)
}

/// [`reduce`] with an explicit visiting order.
///
/// The result is only ancestor-free if `ordering` visits every ancestor
/// before its descendants.
pub fn reduce_with_ordering(
    candidates: &[Location],
    disabled: &HashSet<Location>,
    common_root: &Location,
    ordering: CandidateOrdering,
) -> BTreeSet<Location> {
    if candidates.is_empty() {
        return BTreeSet::new();
    }

    let mut scoped: Vec<&Location> = candidates
        .iter()
        .filter(|candidate| common_root.contains(candidate))
        .collect();
    scoped.sort_by(|a, b| ordering(a, b));

    let mut accepted: BTreeSet<Location> = BTreeSet::new();
    let mut non_leaf: HashSet<Location> = HashSet::new();
    for candidate in &scoped {
        if let Some(floor) = accepted.range::<Location, _>(..=*candidate).next_back() {
            if floor.is_ancestor_of(candidate) {
                // same path under another scheme or authority sorts just before the floor
                non_leaf.extend(
                    accepted
                        .range::<Location, _>(..=floor)
                        .rev()
                        .take_while(|other| other.segments().eq(floor.segments()))
                        .cloned(),
                );
            }
        }
        accepted.insert((*candidate).clone());
    }

    let mut leaves: BTreeSet<Location> = accepted
        .into_iter()
        .filter(|location| !non_leaf.contains(location))
        .collect();

    for location in disabled {
        if leaves.remove(location) {
            info!(dataset = %location, "Skipping disabled dataset");
        }
    }

    debug!(
        candidates = candidates.len(),
        in_root = scoped.len(),
        non_leaf = non_leaf.len(),
        leaves = leaves.len(),
        "Reduced candidate datasets"
    );
    leaves
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    fn locs(items: &[&str]) -> Vec<Location> {
        items.iter().map(|s| loc(s)).collect()
    }

    fn set(items: &[&str]) -> BTreeSet<Location> {
        locs(items).into_iter().collect()
    }

    #[test]
    fn test_empty_candidates() {
        let leaves = reduce(&[], &HashSet::new(), &loc("/root"));
        assert!(leaves.is_empty());
    }

    #[test]
    fn test_parent_dropped_for_child() {
        let candidates = locs(&["/root/a", "/root/a/b", "/root/c"]);
        let leaves = reduce(&candidates, &HashSet::new(), &loc("/root"));
        assert_eq!(leaves, set(&["/root/a/b", "/root/c"]));
    }

    #[test]
    fn test_disabled_removed() {
        let candidates = locs(&["/root/a", "/root/a/b", "/root/c"]);
        let disabled: HashSet<Location> = locs(&["/root/c"]).into_iter().collect();
        let leaves = reduce(&candidates, &disabled, &loc("/root"));
        assert_eq!(leaves, set(&["/root/a/b"]));
    }

    #[test]
    fn test_outside_common_root_discarded() {
        let candidates = locs(&["/other/x", "/rootless/y"]);
        let leaves = reduce(&candidates, &HashSet::new(), &loc("/root"));
        assert!(leaves.is_empty());
    }

    #[test]
    fn test_common_root_itself_is_in_scope() {
        let leaves = reduce(&locs(&["/root"]), &HashSet::new(), &loc("/root"));
        assert_eq!(leaves, set(&["/root"]));
    }

    #[test]
    fn test_disabled_ancestor_does_not_revive_parent() {
        // the parent is already non-leaf; disabling the child leaves nothing
        let candidates = locs(&["/root/a", "/root/a/b"]);
        let disabled: HashSet<Location> = locs(&["/root/a/b"]).into_iter().collect();
        let leaves = reduce(&candidates, &disabled, &loc("/root"));
        assert!(leaves.is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        let candidates = locs(&["/root/a", "/root/a", "/root/b/c", "/root/b/c"]);
        let leaves = reduce(&candidates, &HashSet::new(), &loc("/root"));
        assert_eq!(leaves, set(&["/root/a", "/root/b/c"]));
    }

    #[test]
    fn test_deep_chain_keeps_only_deepest() {
        let candidates = locs(&["/root/a/b/c/d", "/root/a", "/root/a/b/c", "/root/a/b"]);
        let leaves = reduce(&candidates, &HashSet::new(), &loc("/root"));
        assert_eq!(leaves, set(&["/root/a/b/c/d"]));
    }

    #[test]
    fn test_punctuated_siblings_do_not_hide_ancestors() {
        // '-' and '.' sort before '/' byte-wise; path order compares segments
        let candidates = locs(&["/root/a", "/root/a-x", "/root/a.y", "/root/a/b"]);
        let leaves = reduce(&candidates, &HashSet::new(), &loc("/root"));
        assert_eq!(leaves, set(&["/root/a-x", "/root/a.y", "/root/a/b"]));
    }

    #[test]
    fn test_scheme_qualified_candidates() {
        let candidates = locs(&[
            "hdfs://nn/store/data/a",
            "hdfs://nn/store/data/a/hourly",
            "hdfs://nn/store/tags/replicate",
        ]);
        let leaves = reduce(&candidates, &HashSet::new(), &loc("hdfs://nn/store/data"));
        assert_eq!(leaves, set(&["hdfs://nn/store/data/a/hourly"]));
    }

    #[test]
    fn test_equal_paths_across_schemes_are_all_ancestors() {
        let candidates = locs(&["/root/a", "hdfs://nn/root/a", "/root/a/b"]);
        let leaves = reduce(&candidates, &HashSet::new(), &loc("/root"));
        assert_eq!(leaves, set(&["/root/a/b"]));

        let candidates = locs(&["hdfs://nn/root/a", "/root/a", "hdfs://nn/root/a/b", "/root/c"]);
        let leaves = reduce(&candidates, &HashSet::new(), &loc("/root"));
        assert_eq!(leaves, set(&["hdfs://nn/root/a/b", "/root/c"]));
    }

    #[test]
    fn test_by_path_length_orders_by_text_not_depth() {
        let deep = loc("/r/a/b/c");
        let long_sibling = loc("/r/very_long_name");
        assert_eq!(by_path_length(&deep, &long_sibling), Ordering::Less);
        assert!(deep.depth() > long_sibling.depth());

        let leaves = reduce(
            &[long_sibling.clone(), deep.clone(), loc("/r/a")],
            &HashSet::new(),
            &loc("/r"),
        );
        let expected: BTreeSet<Location> = [deep, long_sibling].into_iter().collect();
        assert_eq!(leaves, expected);
    }

    #[test]
    fn test_known_limitation_descendant_first_ordering() {
        // by_path_length visits ancestors first only because a normalized
        // strict ancestor path is always textually shorter. If a descendant is
        // visited before its ancestor the floor check never sees the pair and
        // both survive.
        fn longest_first(a: &Location, b: &Location) -> Ordering {
            by_path_length(b, a)
        }
        let candidates = locs(&["/root/a", "/root/a/b"]);
        let leaves = reduce_with_ordering(&candidates, &HashSet::new(), &loc("/root"), longest_first);
        assert_eq!(leaves, set(&["/root/a", "/root/a/b"]));
    }
}
