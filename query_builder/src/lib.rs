#![forbid(unsafe_code)]

//! Query builder runtime.
//!
//! Wraps the `query_tree` kernel behind a stateful controller that either
//! owns its tree (uncontrolled) or only proposes next trees to a host that
//! owns it (controlled), and exposes the snapshot a renderer consumes.
//!
//! No tree logic lives here; every mutation is delegated to the kernel.

pub mod config;
pub mod controller;
pub mod diff;
pub mod error;
pub mod form;
pub mod input;
pub mod shared;
pub mod snapshot;

pub use config::BuilderConfig;
pub use controller::{ChangeListener, QueryBuilder, QueryBuilderOptions};
pub use diff::{diff_trees, TreeDiff};
pub use error::{ControllerError, ControllerResult};
pub use form::HiddenField;
pub use shared::{QueryActions, SharedQueryBuilder};
pub use snapshot::QueryBuilderSnapshot;
