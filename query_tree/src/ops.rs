//! Query tree: Operation Descriptors
//!
//! Operations are pure data: a target id plus payload. They carry no
//! mutation logic; `engine::apply_op` dispatches them.

use serde::{Deserialize, Serialize};

use crate::domain::{Combinator, RuleUpdate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TreeOp {
    AddRule { group_id: String },
    AddGroup { group_id: String },
    RemoveRule { rule_id: String },
    RemoveGroup { group_id: String },
    RemoveNode { target_id: String },
    UpdateRule { rule_id: String, updates: RuleUpdate },
    SetCombinator { group_id: String, combinator: Combinator },
}

impl TreeOp {
    /// Wire name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            TreeOp::AddRule { .. } => "add_rule",
            TreeOp::AddGroup { .. } => "add_group",
            TreeOp::RemoveRule { .. } => "remove_rule",
            TreeOp::RemoveGroup { .. } => "remove_group",
            TreeOp::RemoveNode { .. } => "remove_node",
            TreeOp::UpdateRule { .. } => "update_rule",
            TreeOp::SetCombinator { .. } => "set_combinator",
        }
    }

    /// Id of the node the operation is aimed at.
    pub fn target(&self) -> &str {
        match self {
            TreeOp::AddRule { group_id }
            | TreeOp::AddGroup { group_id }
            | TreeOp::RemoveGroup { group_id }
            | TreeOp::SetCombinator { group_id, .. } => group_id,
            TreeOp::RemoveRule { rule_id } | TreeOp::UpdateRule { rule_id, .. } => rule_id,
            TreeOp::RemoveNode { target_id } => target_id,
        }
    }
}
