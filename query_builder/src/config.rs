//! Builder configuration: catalogs and an optional preset tree, loaded
//! from JSON.
//!
//! ```json
//! {
//!   "fields": [{ "name": "cpu", "label": "CPU (%)", "type": "number" }],
//!   "operators": [{ "name": "gt", "label": ">" }],
//!   "preset": { "id": "g1", "combinator": "AND", "rules": [] }
//! }
//! ```
//!
//! `operators` and `preset` are optional.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use query_tree::invariants::validate;
use query_tree::{FieldDefinition, Group, OperatorDefinition};

use crate::controller::QueryBuilderOptions;
use crate::error::{ControllerError, ControllerResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderConfig {
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operators: Option<Vec<OperatorDefinition>>,
    #[serde(default, alias = "preset", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Group>,
}

impl BuilderConfig {
    /// Parse and check. `origin` names the source in error messages.
    pub fn from_json_str(text: &str, origin: &str) -> ControllerResult<Self> {
        let config: BuilderConfig =
            serde_json::from_str(text).map_err(|e| ControllerError::Config {
                origin: origin.to_string(),
                reason: e.to_string(),
            })?;
        config.check(origin)?;
        Ok(config)
    }

    #[instrument(level = "debug")]
    pub fn from_path(path: &Path) -> ControllerResult<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_json_str(&text, &path.display().to_string())?;
        debug!(
            fields = config.fields.len(),
            custom_operators = config.operators.is_some(),
            preset = config.default_value.is_some(),
            "loaded builder config"
        );
        Ok(config)
    }

    /// Uncontrolled options seeded from this config.
    pub fn into_options(self) -> QueryBuilderOptions {
        QueryBuilderOptions {
            value: None,
            default_value: self.default_value.map(Arc::new),
            on_change: None,
            fields: Some(self.fields.into()),
            operators: self.operators.map(Into::into),
        }
    }

    fn check(&self, origin: &str) -> ControllerResult<()> {
        let bad = |reason: String| ControllerError::Config {
            origin: origin.to_string(),
            reason,
        };

        let mut names = BTreeSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(bad("field with empty name".to_string()));
            }
            if !names.insert(field.name.as_str()) {
                return Err(bad(format!("duplicate field {:?}", field.name)));
            }
        }

        if let Some(operators) = &self.operators {
            let mut names = BTreeSet::new();
            for op in operators {
                if !names.insert(op.name.as_str()) {
                    return Err(bad(format!("duplicate operator {:?}", op.name)));
                }
            }
        }

        if let Some(preset) = &self.default_value {
            validate(preset)?;
        }
        Ok(())
    }
}
