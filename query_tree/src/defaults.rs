//! Query tree: Default Factory
//!
//! Fresh nodes and the stock catalogs.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{Combinator, FieldDefinition, Group, Node, OperatorDefinition, Rule};
use crate::id::generate_id;

/// Operator every new rule starts with.
pub const DEFAULT_OPERATOR: &str = "eq";

/// Stock operator catalog as `(name, label)`, in display order.
pub const DEFAULT_OPERATORS: [(&str, &str); 11] = [
    ("eq", "="),
    ("neq", "!="),
    ("gt", ">"),
    ("gte", ">="),
    ("lt", "<"),
    ("lte", "<="),
    ("contains", "contains"),
    ("not_contains", "not contains"),
    ("between", "between"),
    ("in", "in"),
    ("not_in", "not in"),
];

/// A rule with a fresh id, no field, `eq`, and an empty string value.
pub fn create_empty_rule() -> Rule {
    Rule {
        id: generate_id(),
        field: String::new(),
        operator: DEFAULT_OPERATOR.to_string(),
        value: Value::String(String::new()),
    }
}

/// A group with a fresh id holding exactly one empty rule, so a new group
/// never renders empty.
pub fn create_empty_group(combinator: Combinator) -> Group {
    Group {
        id: generate_id(),
        combinator,
        rules: vec![Node::from(create_empty_rule())],
    }
}

/// Root used when the caller supplies nothing: `AND` with one empty rule.
pub fn create_default_root() -> Arc<Group> {
    Arc::new(create_empty_group(Combinator::default()))
}

pub fn default_operators() -> Vec<OperatorDefinition> {
    DEFAULT_OPERATORS
        .iter()
        .map(|(name, label)| OperatorDefinition::new(*name, *label))
        .collect()
}

/// There is no sensible universal field list; callers bring their own.
pub fn default_fields() -> Vec<FieldDefinition> {
    Vec::new()
}
