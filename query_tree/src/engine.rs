//! Query tree: Engine
//!
//! Dispatch layer over the pure transition functions. Holds no state.

use std::sync::Arc;

use tracing::debug;

use crate::domain::Group;
use crate::error::TreeResult;
use crate::ops::TreeOp;
use crate::transitions;

/// Apply a single operation and return the next root.
pub fn apply_op(root: &Arc<Group>, op: &TreeOp) -> TreeResult<Arc<Group>> {
    let next = match op {
        TreeOp::AddRule { group_id } => transitions::add_rule(root, group_id),
        TreeOp::AddGroup { group_id } => transitions::add_group(root, group_id),
        TreeOp::RemoveRule { rule_id } => transitions::remove_rule(root, rule_id)?,
        TreeOp::RemoveGroup { group_id } => transitions::remove_group(root, group_id)?,
        TreeOp::RemoveNode { target_id } => transitions::remove_node(root, target_id),
        TreeOp::UpdateRule { rule_id, updates } => {
            transitions::update_rule(root, rule_id, updates)
        }
        TreeOp::SetCombinator {
            group_id,
            combinator,
        } => transitions::set_combinator(root, group_id, *combinator),
    };
    debug!(
        op = op.name(),
        target = op.target(),
        changed = !Arc::ptr_eq(root, &next),
        "applied tree op"
    );
    Ok(next)
}

/// Apply `ops` in order, stopping at the first error.
pub fn apply_sequence(root: &Arc<Group>, ops: &[TreeOp]) -> TreeResult<Arc<Group>> {
    ops.iter()
        .try_fold(Arc::clone(root), |current, op| apply_op(&current, op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Combinator, Node, Rule, RuleUpdate};
    use crate::error::TreeError;
    use serde_json::json;

    fn root() -> Arc<Group> {
        Arc::new(Group {
            id: "root".to_string(),
            combinator: Combinator::And,
            rules: vec![Node::from(Rule {
                id: "r1".to_string(),
                field: String::new(),
                operator: "eq".to_string(),
                value: json!(""),
            })],
        })
    }

    #[test]
    fn test_apply_sequence_folds() {
        let ops = vec![
            TreeOp::AddGroup { group_id: "root".to_string() },
            TreeOp::UpdateRule {
                rule_id: "r1".to_string(),
                updates: RuleUpdate::select_field("age"),
            },
            TreeOp::SetCombinator { group_id: "root".to_string(), combinator: Combinator::Or },
        ];
        let next = apply_sequence(&root(), &ops).unwrap();
        assert_eq!(next.combinator, Combinator::Or);
        assert_eq!(next.rules.len(), 2);
        assert_eq!(next.rules[0].as_rule().unwrap().field, "age");
    }

    #[test]
    fn test_apply_sequence_stops_on_kind_mismatch() {
        let ops = vec![TreeOp::RemoveGroup { group_id: "r1".to_string() }];
        let err = apply_sequence(&root(), &ops).unwrap_err();
        assert!(matches!(err, TreeError::KindMismatch { .. }));
    }

    #[test]
    fn test_empty_sequence_is_identity() {
        let start = root();
        let next = apply_sequence(&start, &[]).unwrap();
        assert!(Arc::ptr_eq(&start, &next));
    }
}
