use foundation::title_case;
use serde_json::{Number, Value};

use crate::entity::Entity;

/// Attributes shown in a bubble, in display order.
pub const ENTITY_KEYS: [&str; 11] = [
    "name",
    "type",
    "industry",
    "occupation",
    "location",
    "revenue",
    "operating_income",
    "net_income",
    "assets",
    "equity",
    "num_employees",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRow {
    pub label: String,
    pub value: String,
}

/// Rows for every whitelisted attribute present on `entity`.
pub fn attribute_rows(entity: &Entity) -> Vec<AttributeRow> {
    ENTITY_KEYS
        .iter()
        .filter_map(|key| {
            let value = entity.get(key)?;
            Some(AttributeRow {
                label: title_case(key),
                value: display_value(value),
            })
        })
        .collect()
}

/// Flattens a loosely typed attribute into display text.
///
/// Objects and arrays render as their comma-joined keys (array keys are
/// indices); `null` renders empty.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => display_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => (0..items.len())
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map.keys().cloned().collect::<Vec<_>>().join(", "),
    }
}

// Integral floats print without a fractional part, matching how the data
// files were authored.
fn display_number(n: &Number) -> String {
    if n.is_f64() {
        n.as_f64().map(|f| f.to_string()).unwrap_or_default()
    } else {
        n.to_string()
    }
}
