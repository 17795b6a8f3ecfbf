//! Tree diff: which nodes a renderer has to revisit.
//!
//! Compares two versions of a tree by id and by `Arc` identity. Nodes that
//! are reference-identical can be skipped wholesale.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use query_tree::walk::nodes;
use query_tree::{Group, Node};

/// Outcome of [`diff_trees`]. Id lists follow pre-order of their tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    /// Only in `after`.
    pub added: Vec<String>,
    /// Only in `before`.
    pub removed: Vec<String>,
    /// In both, but rebuilt.
    pub replaced: Vec<String>,
    /// In both and reference-identical.
    pub shared: usize,
}

impl TreeDiff {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.replaced.is_empty()
    }
}

pub fn diff_trees(before: &Arc<Group>, after: &Arc<Group>) -> TreeDiff {
    let before_nodes = nodes(before);
    let after_nodes = nodes(after);

    let mut index: BTreeMap<&str, &Node> = BTreeMap::new();
    for node in &before_nodes {
        index.entry(node.id()).or_insert(node);
    }

    let mut diff = TreeDiff::default();
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for node in &after_nodes {
        if !seen.insert(node.id()) {
            continue;
        }
        match index.get(node.id()) {
            None => diff.added.push(node.id().to_string()),
            Some(old) if old.ptr_eq(node) => diff.shared += 1,
            Some(_) => diff.replaced.push(node.id().to_string()),
        }
    }

    let mut listed: BTreeSet<&str> = BTreeSet::new();
    for node in &before_nodes {
        if !seen.contains(node.id()) && listed.insert(node.id()) {
            diff.removed.push(node.id().to_string());
        }
    }
    diff
}
