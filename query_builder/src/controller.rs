//! State controller: one tree per instance, controlled or uncontrolled.
//!
//! Controlled: the host owns the tree. Every operation computes the next
//! tree from the host-supplied value and hands it to the change listener;
//! nothing is stored. The host pushes the next authoritative value back
//! with `sync_value`.
//!
//! Uncontrolled: the controller owns the tree, seeded once from the
//! default value (or a fresh `AND` group). Every operation stores the next
//! tree, then notifies the listener if there is one.
//!
//! The mode is fixed at construction.

use std::sync::Arc;

use tracing::{debug, warn};

use query_tree::defaults::create_default_root;
use query_tree::engine::apply_op;
use query_tree::transitions;
use query_tree::{
    default_fields, default_operators, Combinator, FieldDefinition, Group, OperatorDefinition,
    RuleUpdate, TreeOp,
};

use crate::error::{ControllerError, ControllerResult};

/// Receives every tree an operation computes.
pub trait ChangeListener: Send {
    fn on_change(&mut self, next: &Arc<Group>);
}

impl<F> ChangeListener for F
where
    F: FnMut(&Arc<Group>) + Send,
{
    fn on_change(&mut self, next: &Arc<Group>) {
        self(next)
    }
}

/// Construction options. Unset catalogs fall back to the stock ones.
#[derive(Default)]
pub struct QueryBuilderOptions {
    /// Host-owned tree; selects controlled mode.
    pub value: Option<Arc<Group>>,
    /// Seed for uncontrolled mode. Ignored when `value` is set.
    pub default_value: Option<Arc<Group>>,
    pub on_change: Option<Box<dyn ChangeListener>>,
    pub fields: Option<Arc<[FieldDefinition]>>,
    pub operators: Option<Arc<[OperatorDefinition]>>,
}

impl QueryBuilderOptions {
    pub fn with_value(mut self, value: Arc<Group>) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_default_value(mut self, default_value: Arc<Group>) -> Self {
        self.default_value = Some(default_value);
        self
    }

    pub fn with_on_change(mut self, listener: impl ChangeListener + 'static) -> Self {
        self.on_change = Some(Box::new(listener));
        self
    }

    pub fn with_fields(mut self, fields: impl Into<Arc<[FieldDefinition]>>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn with_operators(mut self, operators: impl Into<Arc<[OperatorDefinition]>>) -> Self {
        self.operators = Some(operators.into());
        self
    }
}

impl std::fmt::Debug for QueryBuilderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilderOptions")
            .field("value", &self.value.as_ref().map(|g| &g.id))
            .field("default_value", &self.default_value.as_ref().map(|g| &g.id))
            .field("on_change", &self.on_change.is_some())
            .field("fields", &self.fields.as_ref().map(|f| f.len()))
            .field("operators", &self.operators.as_ref().map(|o| o.len()))
            .finish()
    }
}

/// Where the current tree lives. The only place the mode is branched on.
#[derive(Debug, Clone)]
enum TreeSource {
    Controlled(Arc<Group>),
    Uncontrolled(Arc<Group>),
}

impl TreeSource {
    fn current(&self) -> &Arc<Group> {
        match self {
            TreeSource::Controlled(tree) | TreeSource::Uncontrolled(tree) => tree,
        }
    }

    /// Keep `next` only when the controller owns the tree.
    fn commit(&mut self, next: &Arc<Group>) {
        if let TreeSource::Uncontrolled(tree) = self {
            *tree = Arc::clone(next);
        }
    }
}

pub struct QueryBuilder {
    source: TreeSource,
    on_change: Option<Box<dyn ChangeListener>>,
    fields: Arc<[FieldDefinition]>,
    operators: Arc<[OperatorDefinition]>,
}

impl QueryBuilder {
    pub fn new(options: QueryBuilderOptions) -> Self {
        let QueryBuilderOptions {
            value,
            default_value,
            on_change,
            fields,
            operators,
        } = options;

        let source = match value {
            Some(tree) => {
                if on_change.is_none() {
                    warn!(root = %tree.id, "controlled builder has no change listener; edits will be dropped");
                }
                TreeSource::Controlled(tree)
            }
            None => TreeSource::Uncontrolled(default_value.unwrap_or_else(create_default_root)),
        };
        debug!(
            controlled = matches!(source, TreeSource::Controlled(_)),
            root = %source.current().id,
            "query builder initialised"
        );

        Self {
            source,
            on_change,
            fields: fields.unwrap_or_else(|| default_fields().into()),
            operators: operators.unwrap_or_else(|| default_operators().into()),
        }
    }

    /// Host-owned tree with a listener for proposed changes.
    pub fn controlled(value: Arc<Group>, listener: impl ChangeListener + 'static) -> Self {
        Self::new(
            QueryBuilderOptions::default()
                .with_value(value)
                .with_on_change(listener),
        )
    }

    /// Self-owned tree, seeded from `default_value` or a fresh group.
    pub fn uncontrolled(default_value: Option<Arc<Group>>) -> Self {
        Self::new(QueryBuilderOptions {
            default_value,
            ..Default::default()
        })
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self.source, TreeSource::Controlled(_))
    }

    /// The current tree: the last host value when controlled, the owned
    /// tree otherwise.
    pub fn query(&self) -> &Arc<Group> {
        self.source.current()
    }

    pub fn fields(&self) -> &Arc<[FieldDefinition]> {
        &self.fields
    }

    pub fn operators(&self) -> &Arc<[OperatorDefinition]> {
        &self.operators
    }

    /// Replace the listener; `None` silences notifications.
    pub fn set_on_change(&mut self, listener: Option<Box<dyn ChangeListener>>) {
        self.on_change = listener;
    }

    /// Accept the host's next authoritative tree. Controlled mode only.
    pub fn sync_value(&mut self, value: Arc<Group>) -> ControllerResult<()> {
        match &mut self.source {
            TreeSource::Controlled(tree) => {
                *tree = value;
                Ok(())
            }
            TreeSource::Uncontrolled(_) => Err(ControllerError::NotControlled),
        }
    }

    // ── Operations ─────────────────────────────────────────────────

    pub fn add_rule(&mut self, group_id: &str) -> Arc<Group> {
        let next = transitions::add_rule(self.query(), group_id);
        self.publish(next)
    }

    pub fn add_group(&mut self, group_id: &str) -> Arc<Group> {
        let next = transitions::add_group(self.query(), group_id);
        self.publish(next)
    }

    pub fn remove_rule(&mut self, rule_id: &str) -> ControllerResult<Arc<Group>> {
        let next = transitions::remove_rule(self.query(), rule_id)?;
        Ok(self.publish(next))
    }

    pub fn remove_group(&mut self, group_id: &str) -> ControllerResult<Arc<Group>> {
        let next = transitions::remove_group(self.query(), group_id)?;
        Ok(self.publish(next))
    }

    /// Kind-agnostic removal.
    pub fn remove_node(&mut self, target_id: &str) -> Arc<Group> {
        let next = transitions::remove_node(self.query(), target_id);
        self.publish(next)
    }

    pub fn update_rule(&mut self, rule_id: &str, updates: &RuleUpdate) -> Arc<Group> {
        let next = transitions::update_rule(self.query(), rule_id, updates);
        self.publish(next)
    }

    pub fn set_combinator(&mut self, group_id: &str, combinator: Combinator) -> Arc<Group> {
        let next = transitions::set_combinator(self.query(), group_id, combinator);
        self.publish(next)
    }

    /// Generic entry point for scripted operations.
    pub fn apply(&mut self, op: &TreeOp) -> ControllerResult<Arc<Group>> {
        let next = apply_op(self.query(), op)?;
        Ok(self.publish(next))
    }

    /// Commit (uncontrolled only), then notify. Exactly once per operation,
    /// even when the tree came back unchanged.
    fn publish(&mut self, next: Arc<Group>) -> Arc<Group> {
        self.source.commit(&next);
        match self.on_change.as_mut() {
            Some(listener) => {
                debug!(root = %next.id, "notifying change listener");
                listener.on_change(&next);
            }
            None => debug!(root = %next.id, "no change listener"),
        }
        next
    }
}

impl std::fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("controlled", &self.is_controlled())
            .field("root", &self.query().id)
            .field("on_change", &self.on_change.is_some())
            .field("fields", &self.fields.len())
            .field("operators", &self.operators.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use query_tree::codec::decode_tree;

    fn two_rules() -> Arc<Group> {
        decode_tree(
            r#"{"id":"root","combinator":"AND","rules":[
                {"id":"r1","field":"","operator":"eq","value":""},
                {"id":"r2","field":"","operator":"eq","value":""}
            ]}"#,
        )
        .unwrap()
    }

    fn recorder() -> (Arc<Mutex<Vec<Arc<Group>>>>, impl ChangeListener + 'static) {
        let seen: Arc<Mutex<Vec<Arc<Group>>>> = Arc::default();
        let sink = Arc::clone(&seen);
        (seen, move |next: &Arc<Group>| {
            sink.lock().unwrap().push(Arc::clone(next))
        })
    }

    #[test]
    fn test_uncontrolled_default_root() {
        let qb = QueryBuilder::uncontrolled(None);
        assert!(!qb.is_controlled());
        assert_eq!(qb.query().combinator, Combinator::And);
        assert_eq!(qb.query().rules.len(), 1);
        assert!(qb.fields().is_empty());
        assert_eq!(qb.operators().len(), 11);
    }

    #[test]
    fn test_uncontrolled_uses_default_value_as_is() {
        let seed = two_rules();
        let qb = QueryBuilder::uncontrolled(Some(Arc::clone(&seed)));
        assert!(Arc::ptr_eq(qb.query(), &seed));
    }

    #[test]
    fn test_catalogs_are_not_copied() {
        let fields: Arc<[FieldDefinition]> = vec![FieldDefinition::new("age", "Age")].into();
        let operators: Arc<[OperatorDefinition]> = vec![OperatorDefinition::new("eq", "=")].into();
        let qb = QueryBuilder::new(
            QueryBuilderOptions::default()
                .with_fields(Arc::clone(&fields))
                .with_operators(Arc::clone(&operators)),
        );
        assert!(Arc::ptr_eq(qb.fields(), &fields));
        assert!(Arc::ptr_eq(qb.operators(), &operators));
    }

    #[test]
    fn test_uncontrolled_commits_then_notifies() {
        let (seen, listener) = recorder();
        let mut qb = QueryBuilder::new(
            QueryBuilderOptions::default()
                .with_default_value(two_rules())
                .with_on_change(listener),
        );
        let next = qb.remove_rule("r1").unwrap();
        assert!(Arc::ptr_eq(qb.query(), &next));
        assert_eq!(qb.query().rules.len(), 1);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(Arc::ptr_eq(&seen[0], &next));
    }

    #[test]
    fn test_controlled_stores_nothing() {
        let value = two_rules();
        let (seen, listener) = recorder();
        let mut qb = QueryBuilder::controlled(Arc::clone(&value), listener);
        let next = qb.add_rule("root");
        assert_eq!(next.rules.len(), 3);
        assert!(Arc::ptr_eq(qb.query(), &value));
        assert_eq!(seen.lock().unwrap().len(), 1);

        qb.sync_value(Arc::clone(&next)).unwrap();
        assert!(Arc::ptr_eq(qb.query(), &next));
    }

    #[test]
    fn test_sync_value_rejected_when_uncontrolled() {
        let mut qb = QueryBuilder::uncontrolled(None);
        let err = qb.sync_value(two_rules()).unwrap_err();
        assert!(matches!(err, ControllerError::NotControlled));
    }

    #[test]
    fn test_kind_mismatch_commits_nothing() {
        let (seen, listener) = recorder();
        let mut qb = QueryBuilder::new(
            QueryBuilderOptions::default()
                .with_default_value(two_rules())
                .with_on_change(listener),
        );
        let before = Arc::clone(qb.query());
        assert!(matches!(
            qb.remove_group("r1"),
            Err(ControllerError::Tree(query_tree::TreeError::KindMismatch { .. }))
        ));
        assert!(Arc::ptr_eq(qb.query(), &before));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_miss_still_notifies_once() {
        let (seen, listener) = recorder();
        let mut qb = QueryBuilder::new(
            QueryBuilderOptions::default()
                .with_default_value(two_rules())
                .with_on_change(listener),
        );
        let before = Arc::clone(qb.query());
        let next = qb.set_combinator("ghost", Combinator::Or);
        assert!(Arc::ptr_eq(&next, &before));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_controlled_without_listener_is_read_only() {
        let value = two_rules();
        let mut qb = QueryBuilder::new(QueryBuilderOptions::default().with_value(Arc::clone(&value)));
        assert!(qb.is_controlled());
        qb.add_group("root");
        assert!(Arc::ptr_eq(qb.query(), &value));
    }

    #[test]
    fn test_value_wins_over_default_value() {
        let value = two_rules();
        let qb = QueryBuilder::new(
            QueryBuilderOptions::default()
                .with_value(Arc::clone(&value))
                .with_default_value(create_default_root()),
        );
        assert!(Arc::ptr_eq(qb.query(), &value));
    }
}
