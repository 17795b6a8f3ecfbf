//! Runtime error types.

use thiserror::Error;

use query_tree::TreeError;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Builder is uncontrolled: it owns its tree and accepts no external value")]
    NotControlled,

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("Invalid builder config in {origin}: {reason}")]
    Config { origin: String, reason: String },

    #[error("Failed to read builder config: {0}")]
    Io(#[from] std::io::Error),
}

pub type ControllerResult<T> = Result<T, ControllerError>;
