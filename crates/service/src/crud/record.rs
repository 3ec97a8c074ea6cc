use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde_json::Value;

/// One stored item or user: a flat JSON object.
pub type Record = serde_json::Map<String, Value>;

/// Key type of a record store.
pub trait RecordId: Eq + Hash + Ord + Clone + Display + Debug + Send + Sync + 'static {
    /// Read an id out of a JSON field, e.g. `user_id` in a request body.
    fn from_value(value: &Value) -> Option<Self>;
}

impl RecordId for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl RecordId for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Shallow merge: every field of `fields` overwrites the same field in `target`.
pub fn merge(target: &mut Record, fields: Record) {
    for (k, v) in fields {
        target.insert(k, v);
    }
}

/// Case-insensitive substring match on the record's `name` field.
pub fn name_contains(record: &Record, needle_lower: &str) -> bool {
    record
        .get("name")
        .and_then(Value::as_str)
        .map(|name| name.to_lowercase().contains(needle_lower))
        .unwrap_or(false)
}
