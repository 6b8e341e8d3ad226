//! Longest-common-prefix grouping of table paths.
//!
//! Sibling components of one grid may declare paths at different
//! relationship depths (one field on the order row, another on a joined
//! sub-table). Grouping maps every declared path to a shared "primary"
//! path so a single pass over the primary's rows populates all of them.

use std::collections::{HashMap, HashSet};

/// Map each declared path to the primary path its group is read from.
///
/// Paths related by segment prefix form one group anchored at their
/// longest common segment-prefix; unrelated paths anchor themselves.
/// Deterministic for a given input order.
pub fn group_table_paths(paths: &[String]) -> HashMap<String, String> {
    let mut primaries = HashMap::new();
    let mut processed: HashSet<&str> = HashSet::new();

    for path in paths {
        if processed.contains(path.as_str()) {
            continue;
        }
        let related: Vec<&String> = paths
            .iter()
            .filter(|other| is_prefix_related(path, other))
            .collect();

        if related.len() > 1 {
            let primary = longest_common_prefix(&related);
            for member in related {
                primaries.insert(member.clone(), primary.clone());
                processed.insert(member.as_str());
            }
        } else {
            primaries.insert(path.clone(), path.clone());
            processed.insert(path.as_str());
        }
    }

    primaries
}

/// The distinct primaries, in first-declaration order.
pub fn primary_paths(paths: &[String], primaries: &HashMap<String, String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    for path in paths {
        let primary = primaries.get(path).unwrap_or(path);
        if seen.insert(primary.clone()) {
            ordered.push(primary.clone());
        }
    }
    ordered
}

fn is_prefix_related(a: &str, b: &str) -> bool {
    a == b || a.starts_with(&format!("{b}.")) || b.starts_with(&format!("{a}."))
}

/// Longest common segment-prefix, never shorter than two segments so the
/// primary still names a table plus relationship.
fn longest_common_prefix(paths: &[&String]) -> String {
    let split: Vec<Vec<&str>> = paths.iter().map(|p| p.split('.').collect()).collect();
    let shortest = split.iter().map(Vec::len).min().unwrap_or(0);

    let mut common = 0;
    for i in 0..shortest {
        let segment = split[0][i];
        if split.iter().all(|segments| segments[i] == segment) {
            common = i + 1;
        } else {
            break;
        }
    }

    if common >= 2 {
        return split[0][..common].join(".");
    }

    // Too shallow to anchor row iteration: extend from the deepest
    // member so the primary keeps at least two segments.
    let deepest = split
        .iter()
        .max_by_key(|segments| segments.len())
        .expect("group has at least one path");
    let take = 2.min(deepest.len());
    deepest[..take].join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn lone_path_is_its_own_primary() {
        let input = paths(&["products"]);
        let groups = group_table_paths(&input);
        assert_eq!(groups["products"], "products");
    }

    #[test]
    fn related_paths_share_the_common_prefix() {
        let input = paths(&["order.items", "order.items.detail"]);
        let groups = group_table_paths(&input);
        assert_eq!(groups["order.items"], "order.items");
        assert_eq!(groups["order.items.detail"], "order.items");
    }

    #[test]
    fn unrelated_paths_stay_separate() {
        let input = paths(&["order.items", "shipment.boxes"]);
        let groups = group_table_paths(&input);
        assert_eq!(groups["order.items"], "order.items");
        assert_eq!(groups["shipment.boxes"], "shipment.boxes");
    }

    #[test]
    fn shallow_prefix_extends_to_two_segments() {
        let input = paths(&["order", "order.items"]);
        let groups = group_table_paths(&input);
        assert_eq!(groups["order"], "order.items");
        assert_eq!(groups["order.items"], "order.items");
    }

    #[test]
    fn three_way_group_uses_deepest_common_ancestor() {
        let input = paths(&[
            "mo.items.detail",
            "mo.items",
            "mo.items.detail.evidence",
        ]);
        let groups = group_table_paths(&input);
        for path in &input {
            assert_eq!(groups[path], "mo.items");
        }
    }

    #[test]
    fn grouping_is_deterministic() {
        let input = paths(&["a.b", "a.b.c", "x.y", "a.b.d"]);
        let first = group_table_paths(&input);
        let second = group_table_paths(&input);
        assert_eq!(first, second);
    }
}
