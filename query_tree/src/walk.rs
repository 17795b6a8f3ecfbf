//! Query tree: Tree Walking
//!
//! Read-only traversal helpers. Every search is depth-first pre-order
//! and reports the first match, so results are stable even on a tree
//! that (against the contract) repeats an id.

use std::sync::Arc;

use crate::domain::{Group, Node};

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// First node below `root` whose id is `id`. The root itself is returned
/// as a `Node::Group` when it matches.
pub fn find_node(root: &Arc<Group>, id: &str) -> Option<Node> {
    if root.id == id {
        return Some(Node::Group(Arc::clone(root)));
    }
    find_in_children(root, id)
}

fn find_in_children(group: &Group, id: &str) -> Option<Node> {
    for child in &group.rules {
        if child.id() == id {
            return Some(child.clone());
        }
        if let Node::Group(sub) = child {
            if let Some(found) = find_in_children(sub, id) {
                return Some(found);
            }
        }
    }
    None
}

pub fn contains_id(root: &Arc<Group>, id: &str) -> bool {
    find_node(root, id).is_some()
}

/// Ids from the root down to the first node with `id`, both inclusive.
pub fn path_to(root: &Group, id: &str) -> Option<Vec<String>> {
    let mut path = vec![root.id.clone()];
    if root.id == id || descend(root, id, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn descend(group: &Group, id: &str, path: &mut Vec<String>) -> bool {
    for child in &group.rules {
        path.push(child.id().to_string());
        if child.id() == id {
            return true;
        }
        if let Node::Group(sub) = child {
            if descend(sub, id, path) {
                return true;
            }
        }
        path.pop();
    }
    false
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Every id in pre-order, the root first.
pub fn collect_ids(root: &Group) -> Vec<String> {
    let mut ids = Vec::new();
    visit(root, &mut |node_id, _| ids.push(node_id.to_string()));
    ids
}

/// Total nodes including the root.
pub fn node_count(root: &Group) -> usize {
    let mut n = 0;
    visit(root, &mut |_, _| n += 1);
    n
}

pub fn rule_count(root: &Group) -> usize {
    let mut n = 0;
    visit(root, &mut |_, is_group| {
        if !is_group {
            n += 1;
        }
    });
    n
}

/// Every node in pre-order, the root first. Entries share their `Arc`
/// with the tree.
pub fn nodes(root: &Arc<Group>) -> Vec<Node> {
    let mut out = vec![Node::Group(Arc::clone(root))];
    push_children(root, &mut out);
    out
}

fn push_children(group: &Group, out: &mut Vec<Node>) {
    for child in &group.rules {
        out.push(child.clone());
        if let Node::Group(sub) = child {
            push_children(sub, out);
        }
    }
}

/// Levels of groups; a root with only rules has depth 1.
pub fn depth(root: &Group) -> usize {
    1 + root
        .rules
        .iter()
        .filter_map(Node::as_group)
        .map(|g| depth(g))
        .max()
        .unwrap_or(0)
}

fn visit(group: &Group, f: &mut dyn FnMut(&str, bool)) {
    f(&group.id, true);
    for child in &group.rules {
        match child {
            Node::Group(sub) => visit(sub, f),
            Node::Rule(rule) => f(&rule.id, false),
        }
    }
}
