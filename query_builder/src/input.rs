//! Value input helpers for rule rows.
//!
//! Raw text from a value widget is coerced by the selected field's type
//! before it reaches `update_rule`.

use serde_json::{Number, Value};

use query_tree::{FieldDefinition, FieldType};

/// Catalog lookup by field name.
pub fn field_definition<'a>(
    fields: &'a [FieldDefinition],
    name: &str,
) -> Option<&'a FieldDefinition> {
    fields.iter().find(|f| f.name == name)
}

/// Widget kind for a field. Unknown fields and `select` fields without
/// options get a plain text input.
pub fn input_kind(field: Option<&FieldDefinition>) -> FieldType {
    match field {
        Some(f) => match f.field_type {
            Some(FieldType::Select) if f.options.is_none() => FieldType::Text,
            Some(kind) => kind,
            None => FieldType::Text,
        },
        None => FieldType::Text,
    }
}

/// Typed rule value from raw widget text.
///
/// `number`: blank is `0`, anything unparsable is `null`.
/// `boolean`: only `"true"` is true.
/// Everything else stays a string.
pub fn coerce_input(field: Option<&FieldDefinition>, raw: &str) -> Value {
    match input_kind(field) {
        FieldType::Number => parse_number(raw),
        FieldType::Boolean => Value::Bool(raw == "true"),
        FieldType::Text | FieldType::Date | FieldType::Select => Value::String(raw.to_string()),
    }
}

fn parse_number(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Number(0.into());
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::Number(n.into());
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Text a value widget shows for a rule value; absent shows as empty.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
