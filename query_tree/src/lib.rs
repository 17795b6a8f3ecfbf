#![forbid(unsafe_code)]

//! Immutable filter-tree kernel for a visual query builder.
//!
//! A tree is an `Arc<Group>` root whose children are rules or nested
//! groups. Every mutation is a pure function returning a new root that
//! shares all untouched subtrees with the old one.

pub mod codec;
pub mod defaults;
pub mod domain;
pub mod engine;
pub mod error;
pub mod id;
pub mod invariants;
pub mod ops;
pub mod transitions;
pub mod walk;

pub use defaults::{
    create_default_root, create_empty_group, create_empty_rule, default_fields,
    default_operators,
};
pub use domain::{
    is_group, Combinator, FieldDefinition, FieldOption, FieldType, Group, Node, NodeKind,
    OperatorDefinition, Rule, RuleUpdate,
};
pub use error::{TreeError, TreeResult};
pub use id::generate_id;
pub use ops::TreeOp;
