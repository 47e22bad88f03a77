//! Tree records and the tree visibility engine.
//!
//! Tree data arrives flat: every field of a record is a [`TreeNode`] whose
//! `pid` names its parent (`"root"` for top-level nodes). Nested structure is
//! rebuilt with index-based child lists, never pointer-linked nodes.

use std::collections::{HashMap, HashSet};
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::CellValue;

/// Parent id marking a top-level node.
pub const ROOT_ID: &str = "root";

/// Node identifier. Hosts send numbers or strings; both compare as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawNodeId")]
pub struct NodeId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNodeId {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<RawNodeId> for NodeId {
    fn from(raw: RawNodeId) -> Self {
        match raw {
            RawNodeId::Text(s) => Self(s),
            RawNodeId::Int(i) => Self(i.to_string()),
            RawNodeId::Float(f) => Self(format!("{f}")),
        }
    }
}

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One field of a tree record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub pid: NodeId,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub rank: f64,
    #[serde(default)]
    pub value: CellValue,
}

/// One tree record: field key to node, in source order.
pub type TreeRecord = IndexMap<String, TreeNode>;

/// Reorder a flat tree record so siblings are sorted by `rank` and every
/// node directly follows its parent.
///
/// Nodes whose parent is unknown are treated as top-level. Nodes caught in a
/// `pid` cycle are appended at the end in source order.
pub fn sort_flat_tree(record: &TreeRecord) -> TreeRecord {
    let nodes: Vec<(&String, &TreeNode)> = record.iter().collect();
    let index: HashMap<&NodeId, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, (_, node))| (&node.id, i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut roots = Vec::new();
    for (i, (key, node)) in nodes.iter().enumerate() {
        if node.pid.is_root() {
            roots.push(i);
            continue;
        }
        match index.get(&node.pid) {
            Some(&parent) if parent != i => {
                if let Some(list) = children.get_mut(parent) {
                    list.push(i);
                }
            }
            _ => {
                log::warn!(
                    "tree node {key} ({}) has unknown parent {}",
                    node.id,
                    node.pid
                );
                roots.push(i);
            }
        }
    }

    let rank_of = |i: usize| nodes.get(i).map_or(0.0, |(_, n)| n.rank);
    let by_rank = |a: &usize, b: &usize| {
        rank_of(*a)
            .partial_cmp(&rank_of(*b))
            .unwrap_or(std::cmp::Ordering::Equal)
    };
    roots.sort_by(by_rank);
    for list in &mut children {
        list.sort_by(by_rank);
    }

    let mut order = Vec::with_capacity(nodes.len());
    let mut visited = vec![false; nodes.len()];
    let mut stack: Vec<usize> = roots.into_iter().rev().collect();
    while let Some(i) = stack.pop() {
        match visited.get_mut(i) {
            Some(seen) if !*seen => *seen = true,
            _ => continue,
        }
        order.push(i);
        if let Some(list) = children.get(i) {
            stack.extend(list.iter().rev());
        }
    }
    for (i, seen) in visited.iter().enumerate() {
        if !seen {
            log::warn!("tree node at position {i} is unreachable from the root");
            order.push(i);
        }
    }

    order
        .into_iter()
        .filter_map(|i| nodes.get(i))
        .map(|(key, node)| ((*key).clone(), (*node).clone()))
        .collect()
}

/// Per-node expanded/collapsed state plus the parent/child index needed to
/// propagate it.
#[derive(Debug, Clone, Default)]
pub struct TreeVisibility {
    expanded: HashMap<NodeId, bool>,
    children: HashMap<NodeId, Vec<NodeId>>,
    parents: HashMap<NodeId, NodeId>,
}

impl TreeVisibility {
    /// Seed every node of every record as expanded.
    pub fn new(records: &[TreeRecord]) -> Self {
        let mut vis = Self::default();
        let mut ranks: HashMap<NodeId, f64> = HashMap::new();
        for node in records.iter().flat_map(IndexMap::values) {
            ranks.entry(node.id.clone()).or_insert(node.rank);
            vis.expanded.insert(node.id.clone(), true);
            if node.pid.is_root() || node.pid == node.id {
                continue;
            }
            if vis.parents.contains_key(&node.id) {
                continue;
            }
            vis.parents.insert(node.id.clone(), node.pid.clone());
            vis.children
                .entry(node.pid.clone())
                .or_default()
                .push(node.id.clone());
        }
        for kids in vis.children.values_mut() {
            kids.sort_by(|a, b| {
                let rank = |id: &NodeId| ranks.get(id).copied().unwrap_or_default();
                rank(a)
                    .partial_cmp(&rank(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        vis
    }

    /// Stored state of a node. Unknown nodes count as expanded.
    pub fn is_expanded(&self, id: &NodeId) -> bool {
        self.expanded.get(id).copied().unwrap_or(true)
    }

    pub fn has_children(&self, id: &NodeId) -> bool {
        self.children.get(id).is_some_and(|c| !c.is_empty())
    }

    /// Descendants of `id` reachable without passing through a collapsed node,
    /// in row order.
    ///
    /// These are exactly the rows whose visibility follows `id`'s state;
    /// subtrees under an already-collapsed descendant are left alone.
    pub fn descendants(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut seen: HashSet<&NodeId> = HashSet::new();
        let mut stack: Vec<&NodeId> = vec![id];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            if current != id {
                out.push(current.clone());
                if !self.is_expanded(current) {
                    continue;
                }
            }
            if let Some(kids) = self.children.get(current) {
                stack.extend(kids.iter().rev());
            }
        }
        out
    }

    /// Record a new state for `id` and return the rows it now shows or hides.
    pub fn toggle(&mut self, id: &NodeId, expanded: bool) -> Vec<NodeId> {
        let affected = self.descendants(id);
        self.expanded.insert(id.clone(), expanded);
        log::debug!(
            "tree node {id} {} ({} rows)",
            if expanded { "expanded" } else { "collapsed" },
            affected.len()
        );
        affected
    }

    /// Whether a node's row is shown, i.e. no ancestor is collapsed.
    pub fn is_row_visible(&self, id: &NodeId) -> bool {
        let mut current = id;
        for _ in 0..=self.parents.len() {
            let Some(parent) = self.parents.get(current) else {
                return true;
            };
            if !self.is_expanded(parent) {
                return false;
            }
            current = parent;
        }
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn node(id: &str, pid: &str, level: u32, rank: f64) -> TreeNode {
        TreeNode {
            id: NodeId::new(id),
            pid: NodeId::new(pid),
            level,
            rank,
            value: CellValue::Null,
        }
    }

    /// a ─┬─ b ── d
    ///    └─ c
    /// e
    fn record() -> TreeRecord {
        let mut r = TreeRecord::new();
        r.insert("d".into(), node("d", "b", 3, 0.0));
        r.insert("c".into(), node("c", "a", 2, 2.0));
        r.insert("e".into(), node("e", "root", 1, 5.0));
        r.insert("b".into(), node("b", "a", 2, 1.0));
        r.insert("a".into(), node("a", "root", 1, 0.0));
        r
    }

    fn ids(nodes: &[NodeId]) -> Vec<&str> {
        nodes.iter().map(NodeId::as_str).collect()
    }

    #[test]
    fn test_sort_flat_tree_orders_by_rank_and_parent() {
        let sorted = sort_flat_tree(&record());
        let keys: Vec<&str> = sorted.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b", "d", "c", "e"]);
    }

    #[test]
    fn test_orphans_become_top_level() {
        let mut r = record();
        r.insert("x".into(), node("x", "missing", 1, 1.0));
        let keys: Vec<String> = sort_flat_tree(&r).keys().cloned().collect();
        assert_eq!(keys, ["a", "b", "d", "c", "x", "e"]);
    }

    #[test]
    fn test_numeric_ids_deserialize_as_strings() {
        let n: TreeNode =
            serde_json::from_str(r#"{"id": 7, "pid": "root", "level": 1, "rank": 3, "value": 1.5}"#)
                .unwrap();
        assert_eq!(n.id.as_str(), "7");
        assert!(n.pid.is_root());
    }

    #[test]
    fn test_collapse_preserves_nested_state() {
        let records = vec![record()];
        let mut vis = TreeVisibility::new(&records);
        let a = NodeId::new("a");
        let b = NodeId::new("b");

        // Collapse b first: only d hides.
        assert_eq!(ids(&vis.toggle(&b, false)), ["d"]);
        assert!(!vis.is_row_visible(&NodeId::new("d")));

        // Collapsing a touches b and c but not d, which is already hidden.
        assert_eq!(ids(&vis.toggle(&a, false)), ["b", "c"]);
        assert!(!vis.is_row_visible(&b));

        // Expanding a shows b and c again; d stays under collapsed b.
        assert_eq!(ids(&vis.toggle(&a, true)), ["b", "c"]);
        assert!(vis.is_row_visible(&b));
        assert!(!vis.is_row_visible(&NodeId::new("d")));
        assert!(!vis.is_expanded(&b));
    }

    #[test]
    fn test_full_subtree_when_everything_expanded() {
        let vis = TreeVisibility::new(&[record()]);
        assert_eq!(ids(&vis.descendants(&NodeId::new("a"))), ["b", "d", "c"]);
        assert!(vis.has_children(&NodeId::new("a")));
        assert!(!vis.has_children(&NodeId::new("e")));
    }
}
