//! Query tree: Error Types
//!
//! The mutation engine is total on well-formed trees. The only runtime
//! failure is a kind-checked remove aimed at the wrong node kind; the
//! remaining variants come from decoding and validating external input.

use thiserror::Error;

use crate::domain::NodeKind;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Node {id:?} is a {found}, expected a {expected}")]
    KindMismatch {
        id: String,
        expected: NodeKind,
        found: NodeKind,
    },

    #[error("Duplicate node id {0:?}")]
    DuplicateId(String),

    #[error("Empty node id under group {parent:?}")]
    EmptyId { parent: String },

    #[error("Tree codec failed: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type TreeResult<T> = Result<T, TreeError>;
