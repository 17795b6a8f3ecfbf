//! Hidden form field carrying the tree for plain form submission.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use query_tree::codec::{decode_tree, encode_tree};
use query_tree::{Group, TreeResult};

/// `<input type="hidden" name=.. value=..>` equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenField {
    pub name: String,
    /// Compact JSON of the tree.
    pub value: String,
}

impl HiddenField {
    pub fn for_tree(name: impl Into<String>, tree: &Group) -> TreeResult<Self> {
        Ok(Self {
            name: name.into(),
            value: encode_tree(tree)?,
        })
    }

    /// Decode the submitted value back into a tree.
    pub fn parse(&self) -> TreeResult<Arc<Group>> {
        decode_tree(&self.value)
    }
}
