//! Query tree: Invariant Checks
//!
//! The engine trusts its input; these checks are for trees arriving from
//! outside (decoded JSON, configuration presets). Returns the first
//! violation found in pre-order.

use std::collections::BTreeSet;

use crate::domain::{Group, Node};
use crate::error::{TreeError, TreeResult};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Every id is non-empty and unique within the tree.
pub fn validate(root: &Group) -> TreeResult<()> {
    if root.id.is_empty() {
        return Err(TreeError::EmptyId {
            parent: String::new(),
        });
    }
    let mut seen = BTreeSet::new();
    seen.insert(root.id.as_str());
    check_group(root, &mut seen)
}

pub fn is_well_formed(root: &Group) -> bool {
    validate(root).is_ok()
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

fn check_group<'a>(group: &'a Group, seen: &mut BTreeSet<&'a str>) -> TreeResult<()> {
    for child in &group.rules {
        let id = child.id();
        if id.is_empty() {
            return Err(TreeError::EmptyId {
                parent: group.id.clone(),
            });
        }
        if !seen.insert(id) {
            return Err(TreeError::DuplicateId(id.to_string()));
        }
        if let Node::Group(sub) = child {
            check_group(sub, seen)?;
        }
    }
    Ok(())
}
