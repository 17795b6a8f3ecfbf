//! Query tree: Core Domain Types
//!
//! Pure data. No mutation logic lives here.
//! Nodes are shared through `Arc`; identity is `Arc::ptr_eq`.

use std::sync::Arc;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Tree Nodes ─────────────────────────────────────────────────────

/// Boolean operator joining the children of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Combinator {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl Combinator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }
}

impl std::fmt::Display for Combinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field/operator/value condition. Leaf of the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    /// Empty means "no field selected yet".
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub operator: String,
    /// `Null` stands for an absent value and is omitted on the wire.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
}

/// Interior node combining its children with a combinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub combinator: Combinator,
    pub rules: Vec<Node>,
}

/// Either a leaf rule or a nested group.
///
/// On the wire the two are told apart by shape: an object carrying both
/// `combinator` and `rules` is a group, anything else is a rule. A
/// group-shaped object that fails to decode as a group is an error, never
/// a rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Group(Arc<Group>),
    Rule(Arc<Rule>),
}

impl Node {
    /// The one place that decides between recursing and stopping.
    pub fn is_group(&self) -> bool {
        matches!(self, Node::Group(_))
    }

    pub fn id(&self) -> &str {
        match self {
            Node::Group(g) => &g.id,
            Node::Rule(r) => &r.id,
        }
    }

    pub fn as_group(&self) -> Option<&Arc<Group>> {
        match self {
            Node::Group(g) => Some(g),
            Node::Rule(_) => None,
        }
    }

    pub fn as_rule(&self) -> Option<&Arc<Rule>> {
        match self {
            Node::Rule(r) => Some(r),
            Node::Group(_) => None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Group(_) => NodeKind::Group,
            Node::Rule(_) => NodeKind::Rule,
        }
    }

    /// Reference identity, not value equality.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Group(a), Node::Group(b)) => Arc::ptr_eq(a, b),
            (Node::Rule(a), Node::Rule(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        if raw.get("combinator").is_some() && raw.get("rules").is_some() {
            Group::deserialize(raw)
                .map(Node::from)
                .map_err(de::Error::custom)
        } else {
            Rule::deserialize(raw)
                .map(Node::from)
                .map_err(de::Error::custom)
        }
    }
}

impl From<Rule> for Node {
    fn from(rule: Rule) -> Self {
        Node::Rule(Arc::new(rule))
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(Arc::new(group))
    }
}

impl From<Arc<Group>> for Node {
    fn from(group: Arc<Group>) -> Self {
        Node::Group(group)
    }
}

/// Discriminant of a node, used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Rule,
    Group,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Rule => f.write_str("rule"),
            NodeKind::Group => f.write_str("group"),
        }
    }
}

/// Free-function form of [`Node::is_group`].
pub fn is_group(node: &Node) -> bool {
    node.is_group()
}

impl Group {
    /// Copy of this group with `rules[index]` swapped for `child`.
    /// Every other child is shared with `self`.
    pub(crate) fn with_child(&self, index: usize, child: Node) -> Group {
        let mut rules = self.rules.clone();
        rules[index] = child;
        Group {
            id: self.id.clone(),
            combinator: self.combinator,
            rules,
        }
    }

    pub(crate) fn with_rules(&self, rules: Vec<Node>) -> Group {
        Group {
            id: self.id.clone(),
            combinator: self.combinator,
            rules,
        }
    }
}

// ── Partial Updates ────────────────────────────────────────────────

/// Partial rule update. No `id` member: a rule's id
/// cannot be changed, and an `id` key in JSON input is dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl RuleUpdate {
    /// Selecting a new field clears the value typed for the previous one.
    pub fn select_field(name: impl Into<String>) -> Self {
        Self {
            field: Some(name.into()),
            value: Some(Value::String(String::new())),
            ..Default::default()
        }
    }

    pub fn operator(name: impl Into<String>) -> Self {
        Self {
            operator: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_none() && self.operator.is_none() && self.value.is_none()
    }

    /// Shallow merge onto `rule`. The id always comes from `rule`.
    pub fn merge_into(&self, rule: &Rule) -> Rule {
        Rule {
            id: rule.id.clone(),
            field: self.field.clone().unwrap_or_else(|| rule.field.clone()),
            operator: self
                .operator
                .clone()
                .unwrap_or_else(|| rule.operator.clone()),
            value: self.value.clone().unwrap_or_else(|| rule.value.clone()),
        }
    }
}

// ── Catalogs ───────────────────────────────────────────────────────

/// Input widget kind for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Boolean,
    Select,
}

/// One choice of a `select` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    /// Only meaningful when `field_type` is `Select`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type: None,
            options: None,
        }
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorDefinition {
    pub name: String,
    pub label: String,
}

impl OperatorDefinition {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}
