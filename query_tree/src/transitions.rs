//! Query tree: Mutation Engine
//!
//! ALL tree-mutation logic lives here.
//! Every function takes the current root and returns the next root. Nodes
//! are never edited in place: the changed node and its ancestors are
//! rebuilt, every other subtree is shared with the input by `Arc`.
//!
//! Searches are depth-first pre-order. Locate-by-id operations act on the
//! first match; removal filters every match. A miss returns the input root
//! itself.

use std::sync::Arc;

use tracing::{instrument, trace, warn};

use crate::defaults::{create_empty_group, create_empty_rule};
use crate::domain::{Combinator, Group, Node, NodeKind, RuleUpdate};
use crate::error::{TreeError, TreeResult};
use crate::walk::find_node;

// ---------------------------------------------------------------------------
// Public operations
// ---------------------------------------------------------------------------

/// Append a fresh empty rule to the group `group_id`.
#[instrument(level = "trace", skip(root), fields(root = %root.id))]
pub fn add_rule(root: &Arc<Group>, group_id: &str) -> Arc<Group> {
    append_child(root, group_id, Node::from(create_empty_rule()))
}

/// Append a fresh empty group (holding one empty rule) to `group_id`.
#[instrument(level = "trace", skip(root), fields(root = %root.id))]
pub fn add_group(root: &Arc<Group>, group_id: &str) -> Arc<Group> {
    append_child(
        root,
        group_id,
        Node::from(create_empty_group(Combinator::default())),
    )
}

/// Append an arbitrary node to `group_id`.
pub fn append_child(root: &Arc<Group>, group_id: &str, child: Node) -> Arc<Group> {
    let mut child = Some(child);
    let next = rewrite_group(root, group_id, &mut |group| {
        let mut rules = group.rules.clone();
        if let Some(node) = child.take() {
            rules.push(node);
        }
        group.with_rules(rules)
    });
    finish(root, next, "append_child", group_id)
}

/// Remove every child whose id is `target_id`, wherever it sits, together
/// with its whole subtree. The root itself is never removed.
#[instrument(level = "trace", skip(root), fields(root = %root.id))]
pub fn remove_node(root: &Arc<Group>, target_id: &str) -> Arc<Group> {
    let next = filter_out(root, target_id);
    finish(root, next, "remove_node", target_id)
}

/// Like [`remove_node`], but refuses when `rule_id` names a group.
pub fn remove_rule(root: &Arc<Group>, rule_id: &str) -> TreeResult<Arc<Group>> {
    check_kind(root, rule_id, NodeKind::Rule)?;
    Ok(remove_node(root, rule_id))
}

/// Like [`remove_node`], but refuses when `group_id` names a rule.
pub fn remove_group(root: &Arc<Group>, group_id: &str) -> TreeResult<Arc<Group>> {
    check_kind(root, group_id, NodeKind::Group)?;
    Ok(remove_node(root, group_id))
}

/// Shallow-merge `updates` into the rule `rule_id`. The id is kept.
/// Groups are never matched, even if their id equals `rule_id`.
#[instrument(level = "trace", skip(root), fields(root = %root.id))]
pub fn update_rule(root: &Arc<Group>, rule_id: &str, updates: &RuleUpdate) -> Arc<Group> {
    let next = rewrite_rule(root, rule_id, updates);
    finish(root, next, "update_rule", rule_id)
}

/// Replace only the combinator of the group `group_id` (the root included).
/// On a miss the very same root `Arc` comes back, so callers can skip work
/// with `Arc::ptr_eq`.
#[instrument(level = "trace", skip(root), fields(root = %root.id))]
pub fn set_combinator(root: &Arc<Group>, group_id: &str, combinator: Combinator) -> Arc<Group> {
    let next = rewrite_group(root, group_id, &mut |group| Group {
        id: group.id.clone(),
        combinator,
        rules: group.rules.clone(),
    });
    finish(root, next, "set_combinator", group_id)
}

// ---------------------------------------------------------------------------
// Path copying (private)
// ---------------------------------------------------------------------------

/// Rebuild the first group with `group_id` through `edit`, then every
/// ancestor up to `group`. `None` means nothing matched.
fn rewrite_group(
    group: &Arc<Group>,
    group_id: &str,
    edit: &mut dyn FnMut(&Group) -> Group,
) -> Option<Arc<Group>> {
    if group.id == group_id {
        return Some(Arc::new(edit(group)));
    }
    for (index, child) in group.rules.iter().enumerate() {
        if let Node::Group(sub) = child {
            if let Some(next) = rewrite_group(sub, group_id, edit) {
                return Some(Arc::new(group.with_child(index, Node::Group(next))));
            }
        }
    }
    None
}

fn rewrite_rule(group: &Arc<Group>, rule_id: &str, updates: &RuleUpdate) -> Option<Arc<Group>> {
    for (index, child) in group.rules.iter().enumerate() {
        let replacement = match child {
            Node::Rule(rule) if rule.id == rule_id => Node::from(updates.merge_into(rule)),
            Node::Rule(_) => continue,
            Node::Group(sub) => match rewrite_rule(sub, rule_id, updates) {
                Some(next) => Node::Group(next),
                None => continue,
            },
        };
        return Some(Arc::new(group.with_child(index, replacement)));
    }
    None
}

/// Drop matching children at this level, then recurse into the groups
/// that remain. Untouched children keep their `Arc`.
fn filter_out(group: &Arc<Group>, target_id: &str) -> Option<Arc<Group>> {
    let mut changed = false;
    let mut rules = Vec::with_capacity(group.rules.len());
    for child in &group.rules {
        if child.id() == target_id {
            changed = true;
            continue;
        }
        match child {
            Node::Group(sub) => match filter_out(sub, target_id) {
                Some(next) => {
                    changed = true;
                    rules.push(Node::Group(next));
                }
                None => rules.push(child.clone()),
            },
            Node::Rule(_) => rules.push(child.clone()),
        }
    }
    changed.then(|| Arc::new(group.with_rules(rules)))
}

/// Only children are searched: the root is never removable, so its id is
/// a plain miss for both kinds.
fn check_kind(root: &Arc<Group>, id: &str, expected: NodeKind) -> TreeResult<()> {
    let found = root.rules.iter().find_map(|child| match child {
        Node::Group(sub) => find_node(sub, id),
        Node::Rule(rule) => (rule.id == id).then(|| child.clone()),
    });
    match found {
        Some(node) if node.kind() != expected => {
            warn!(id, %expected, found = %node.kind(), "remove aimed at wrong node kind");
            Err(TreeError::KindMismatch {
                id: id.to_string(),
                expected,
                found: node.kind(),
            })
        }
        _ => Ok(()),
    }
}

fn finish(root: &Arc<Group>, next: Option<Arc<Group>>, op: &str, target: &str) -> Arc<Group> {
    match next {
        Some(next) => next,
        None => {
            trace!(op, target, "target not found, tree unchanged");
            Arc::clone(root)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rule;
    use serde_json::json;

    fn rule(id: &str) -> Node {
        Node::from(Rule {
            id: id.to_string(),
            field: String::new(),
            operator: "eq".to_string(),
            value: json!(""),
        })
    }

    fn group(id: &str, combinator: Combinator, rules: Vec<Node>) -> Node {
        Node::from(Group {
            id: id.to_string(),
            combinator,
            rules,
        })
    }

    fn root(rules: Vec<Node>) -> Arc<Group> {
        Arc::new(Group {
            id: "root".to_string(),
            combinator: Combinator::And,
            rules,
        })
    }

    fn child_group(g: &Group, index: usize) -> &Arc<Group> {
        g.rules[index].as_group().expect("expected a group")
    }

    #[test]
    fn test_add_rule_appends_to_root() {
        let before = root(vec![rule("r1")]);
        let after = add_rule(&before, "root");
        assert_eq!(after.rules.len(), 2);
        assert!(after.rules[0].ptr_eq(&before.rules[0]));
        let added = after.rules[1].as_rule().unwrap();
        assert_ne!(added.id, "r1");
        assert_eq!(added.operator, "eq");
        assert_eq!(before.rules.len(), 1, "input must stay untouched");
    }

    #[test]
    fn test_add_group_appends_group_with_one_rule() {
        let before = root(vec![
            rule("r0"),
            group("g1", Combinator::Or, vec![rule("r1")]),
        ]);
        let after = add_group(&before, "g1");
        let g1 = child_group(&after, 1);
        assert_eq!(g1.rules.len(), 2);
        let added = g1.rules[1].as_group().unwrap();
        assert_eq!(added.combinator, Combinator::And);
        assert_eq!(added.rules.len(), 1);
        assert!(after.rules[0].ptr_eq(&before.rules[0]));
        assert!(g1.rules[0].ptr_eq(&child_group(&before, 1).rules[0]));
    }

    #[test]
    fn test_add_to_rule_id_is_noop() {
        let before = root(vec![rule("r1")]);
        let after = add_rule(&before, "r1");
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_remove_node_drops_every_level_match() {
        let before = root(vec![
            group("g1", Combinator::Or, vec![rule("r1"), rule("r2")]),
            group("g2", Combinator::And, vec![rule("r3")]),
        ]);
        let after = remove_node(&before, "r1");
        let g1 = child_group(&after, 0);
        assert_eq!(g1.rules.len(), 1);
        assert_eq!(g1.rules[0].id(), "r2");
        assert!(g1.rules[0].ptr_eq(&child_group(&before, 0).rules[1]));
        assert!(after.rules[1].ptr_eq(&before.rules[1]));
    }

    #[test]
    fn test_remove_root_id_is_noop() {
        let before = root(vec![rule("r1")]);
        assert!(Arc::ptr_eq(&remove_node(&before, "root"), &before));
    }

    #[test]
    fn test_remove_by_kind_on_root_id_is_noop() {
        let before = root(vec![rule("r1"), group("g1", Combinator::Or, vec![])]);
        let after = remove_rule(&before, "root").unwrap();
        assert!(Arc::ptr_eq(&after, &before));
        let after = remove_group(&before, "root").unwrap();
        assert!(Arc::ptr_eq(&after, &before));
    }

    #[test]
    fn test_remove_rule_rejects_group_id() {
        let before = root(vec![group("g1", Combinator::Or, vec![rule("r1")])]);
        let err = remove_rule(&before, "g1").unwrap_err();
        assert!(matches!(
            err,
            TreeError::KindMismatch { expected: NodeKind::Rule, found: NodeKind::Group, .. }
        ));
        let err = remove_group(&before, "r1").unwrap_err();
        assert!(matches!(err, TreeError::KindMismatch { expected: NodeKind::Group, .. }));
    }

    #[test]
    fn test_remove_missing_is_ok_and_shared() {
        let before = root(vec![rule("r1")]);
        let after = remove_rule(&before, "ghost").unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        let after = remove_group(&before, "ghost").unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_update_rule_merges_and_keeps_id() {
        let before = root(vec![rule("r1"), rule("r2")]);
        let updates = RuleUpdate {
            field: Some("name".to_string()),
            value: Some(json!("test")),
            ..Default::default()
        };
        let after = update_rule(&before, "r1", &updates);
        let r1 = after.rules[0].as_rule().unwrap();
        assert_eq!(r1.id, "r1");
        assert_eq!(r1.field, "name");
        assert_eq!(r1.operator, "eq");
        assert_eq!(r1.value, json!("test"));
        assert!(after.rules[1].ptr_eq(&before.rules[1]));
    }

    #[test]
    fn test_update_rule_skips_groups() {
        let before = root(vec![group("x", Combinator::Or, vec![])]);
        let after = update_rule(&before, "x", &RuleUpdate::operator("gt"));
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_update_rule_first_match_only() {
        // Duplicate ids are a caller bug; behaviour must still be stable.
        let before = root(vec![rule("dup"), rule("dup")]);
        let after = update_rule(&before, "dup", &RuleUpdate::operator("gt"));
        assert_eq!(after.rules[0].as_rule().unwrap().operator, "gt");
        assert!(after.rules[1].ptr_eq(&before.rules[1]));
    }

    #[test]
    fn test_set_combinator_keeps_descendants() {
        let before = root(vec![
            rule("r0"),
            group("g1", Combinator::And, vec![rule("r1")]),
        ]);
        let after = set_combinator(&before, "g1", Combinator::Or);
        let g1 = child_group(&after, 1);
        assert_eq!(g1.combinator, Combinator::Or);
        assert!(g1.rules[0].ptr_eq(&child_group(&before, 1).rules[0]));
        assert!(after.rules[0].ptr_eq(&before.rules[0]));
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_set_combinator_on_root() {
        let before = root(vec![rule("r0")]);
        let after = set_combinator(&before, "root", Combinator::Or);
        assert_eq!(after.combinator, Combinator::Or);
        assert!(after.rules[0].ptr_eq(&before.rules[0]));
    }

    #[test]
    fn test_set_combinator_miss_returns_same_root() {
        let before = root(vec![rule("r0")]);
        let after = set_combinator(&before, "does-not-exist", Combinator::Or);
        assert!(Arc::ptr_eq(&before, &after));
    }
}
