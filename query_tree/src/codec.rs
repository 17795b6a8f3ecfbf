//! Query tree: Codec and Fingerprint
//!
//! Compact JSON in the same shape hosts exchange (groups carry
//! `combinator` + `rules`, rules carry `field`/`operator`/`value`).
//! Field order follows struct order; rule values keep their key order.
//!
//! The fingerprint is the lowercase hex SHA-256 of the compact encoding,
//! so value-equal trees share a fingerprint.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::domain::Group;
use crate::error::TreeResult;
use crate::invariants::validate;

/// Compact JSON text of the tree.
pub fn encode_tree(root: &Group) -> TreeResult<String> {
    Ok(serde_json::to_string(root)?)
}

/// Decode without checking ids.
pub fn decode_tree(text: &str) -> TreeResult<Arc<Group>> {
    Ok(Arc::new(serde_json::from_str(text)?))
}

/// Decode and reject empty or duplicate ids.
pub fn decode_tree_checked(text: &str) -> TreeResult<Arc<Group>> {
    let root = decode_tree(text)?;
    validate(&root)?;
    Ok(root)
}

/// SHA-256 of the compact encoding, lowercase hex.
pub fn fingerprint(root: &Group) -> TreeResult<String> {
    let bytes = encode_tree(root)?;
    let digest = Sha256::digest(bytes.as_bytes());
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}
