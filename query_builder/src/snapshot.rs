//! Presentation snapshot: what a renderer receives from the controller.

use std::sync::Arc;

use query_tree::{FieldDefinition, Group, OperatorDefinition};

use crate::input::field_definition;
use crate::shared::QueryActions;

/// Tree and catalogs at the moment of the snapshot, plus the bound
/// operations. The operations always act on the controller's *current*
/// tree, which may be newer than `query`.
#[derive(Debug, Clone)]
pub struct QueryBuilderSnapshot {
    pub query: Arc<Group>,
    pub fields: Arc<[FieldDefinition]>,
    pub operators: Arc<[OperatorDefinition]>,
    pub actions: QueryActions,
}

impl QueryBuilderSnapshot {
    /// Field definition a rule row should render for `name`.
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        field_definition(&self.fields, name)
    }

    /// Cheap re-render check: true if `query` is the very same tree.
    pub fn is_current(&self, query: &Arc<Group>) -> bool {
        Arc::ptr_eq(&self.query, query)
    }
}
