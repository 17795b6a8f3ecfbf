//! Thread-safe controller handle and its bound operations.
//!
//! The read-modify-write of the tree happens under one `Mutex`, so each
//! operation commits and notifies before the next one starts. Listeners
//! run while the lock is held and must not call back into the same handle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use query_tree::{Combinator, Group, RuleUpdate, TreeOp};

use crate::controller::QueryBuilder;
use crate::error::ControllerResult;
use crate::snapshot::QueryBuilderSnapshot;

/// Shared owner of one `QueryBuilder`.
#[derive(Clone)]
pub struct SharedQueryBuilder {
    inner: Arc<Mutex<QueryBuilder>>,
}

impl SharedQueryBuilder {
    pub fn new(builder: QueryBuilder) -> Self {
        Self {
            inner: Arc::new(Mutex::new(builder)),
        }
    }

    /// Run `f` with exclusive access to the controller.
    pub fn with<R>(&self, f: impl FnOnce(&mut QueryBuilder) -> R) -> R {
        f(&mut lock(&self.inner))
    }

    pub fn query(&self) -> Arc<Group> {
        Arc::clone(lock(&self.inner).query())
    }

    pub fn sync_value(&self, value: Arc<Group>) -> ControllerResult<()> {
        lock(&self.inner).sync_value(value)
    }

    /// Bound operations acting on whatever tree is current when called.
    pub fn actions(&self) -> QueryActions {
        QueryActions {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Read-only view for the rendering layer.
    pub fn snapshot(&self) -> QueryBuilderSnapshot {
        let guard = lock(&self.inner);
        QueryBuilderSnapshot {
            query: Arc::clone(guard.query()),
            fields: Arc::clone(guard.fields()),
            operators: Arc::clone(guard.operators()),
            actions: self.actions(),
        }
    }
}

/// Cloneable set of the operations a renderer wires to its controls.
#[derive(Clone)]
pub struct QueryActions {
    inner: Arc<Mutex<QueryBuilder>>,
}

impl QueryActions {
    pub fn add_rule(&self, group_id: &str) -> Arc<Group> {
        lock(&self.inner).add_rule(group_id)
    }

    pub fn add_group(&self, group_id: &str) -> Arc<Group> {
        lock(&self.inner).add_group(group_id)
    }

    pub fn remove_rule(&self, rule_id: &str) -> ControllerResult<Arc<Group>> {
        lock(&self.inner).remove_rule(rule_id)
    }

    pub fn remove_group(&self, group_id: &str) -> ControllerResult<Arc<Group>> {
        lock(&self.inner).remove_group(group_id)
    }

    pub fn update_rule(&self, rule_id: &str, updates: &RuleUpdate) -> Arc<Group> {
        lock(&self.inner).update_rule(rule_id, updates)
    }

    pub fn set_combinator(&self, group_id: &str, combinator: Combinator) -> Arc<Group> {
        lock(&self.inner).set_combinator(group_id, combinator)
    }

    pub fn apply(&self, op: &TreeOp) -> ControllerResult<Arc<Group>> {
        lock(&self.inner).apply(op)
    }
}

impl std::fmt::Debug for QueryActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryActions").finish_non_exhaustive()
    }
}

/// A panicking listener must not brick the builder: the tree is only ever
/// swapped whole, so a poisoned guard still holds a consistent value.
fn lock(inner: &Mutex<QueryBuilder>) -> MutexGuard<'_, QueryBuilder> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
