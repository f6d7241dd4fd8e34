//! JSON serialization of formatted records
//!
//! Serialization never fails. Hazards are handled while walking the value
//! tree:
//!
//! - a shared object already written once is left out (array slots become
//!   `null`), which breaks cycles
//! - errors go through [`LogFormatter::format_error`]
//! - `BigInt` values are written as decimal strings
//! - NaN and infinities are written as `null`
//!
//! The set of written objects is rebuilt on every call.

use super::attributes::{AttributeValue, Attributes};
use super::formatter::LogFormatter;
use super::log_item::LogItem;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::HashSet;

/// Indentation of the serialized line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonIndent(pub usize);

impl JsonIndent {
    /// Single line
    pub const COMPACT: JsonIndent = JsonIndent(0);
    /// Four spaces, used in dev mode
    pub const PRETTY: JsonIndent = JsonIndent(4);

    pub fn is_compact(&self) -> bool {
        self.0 == 0
    }
}

impl Default for JsonIndent {
    fn default() -> Self {
        Self::COMPACT
    }
}

/// Serialize a formatted item
///
/// # Example
///
/// ```
/// use rust_lambda_logger::core::{serialize, JsonIndent, LogItem, PowertoolsLogFormatter};
///
/// let item = LogItem::new().with("level", "INFO").with("big", i128::MAX);
/// let line = serialize(&item, JsonIndent::COMPACT, &PowertoolsLogFormatter);
/// assert_eq!(
///     line,
///     r#"{"level":"INFO","big":"170141183460469231731687303715884105727"}"#
/// );
/// ```
pub fn serialize(item: &LogItem, indent: JsonIndent, formatter: &dyn LogFormatter) -> String {
    let mut walker = Walker::new(formatter);
    let mut map = Map::new();
    for (key, value) in item.entries() {
        if let Some(json) = walker.convert(value) {
            map.insert(key.clone(), json);
        }
    }
    write_json(&Value::Object(map), indent)
}

/// Convert a single attribute value with the same safety rules
///
/// Returns `Value::Null` when the value itself is elided.
pub fn serialize_value(value: &AttributeValue, formatter: &dyn LogFormatter) -> Value {
    Walker::new(formatter).convert(value).unwrap_or(Value::Null)
}

fn write_json(value: &Value, indent: JsonIndent) -> String {
    if indent.is_compact() {
        return serde_json::to_string(value).unwrap_or_default();
    }

    let spaces = vec![b' '; indent.0];
    let mut buf = Vec::new();
    let pretty = serde_json::ser::PrettyFormatter::with_indent(&spaces);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, pretty);
    match value.serialize(&mut serializer) {
        Ok(()) => String::from_utf8(buf).unwrap_or_default(),
        Err(_) => String::new(),
    }
}

struct Walker<'a> {
    formatter: &'a dyn LogFormatter,
    seen: HashSet<usize>,
}

impl<'a> Walker<'a> {
    fn new(formatter: &'a dyn LogFormatter) -> Self {
        Self {
            formatter,
            seen: HashSet::new(),
        }
    }

    /// `None` means the value is elided
    fn convert(&mut self, value: &AttributeValue) -> Option<Value> {
        let json = match value {
            AttributeValue::Null => Value::Null,
            AttributeValue::Bool(b) => Value::Bool(*b),
            AttributeValue::Int(i) => Value::from(*i),
            AttributeValue::UInt(u) => Value::from(*u),
            AttributeValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            AttributeValue::BigInt(i) => Value::String(i.to_string()),
            AttributeValue::String(s) => Value::String(s.clone()),
            AttributeValue::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.convert(item).unwrap_or(Value::Null))
                    .collect(),
            ),
            AttributeValue::Object(obj) => {
                if !self.seen.insert(obj.id()) {
                    return None;
                }
                self.convert_map(&obj.snapshot())
            }
            AttributeValue::Error(error) => {
                let formatted = self.formatter.format_error(error);
                self.convert_map(&formatted)
            }
        };
        Some(json)
    }

    fn convert_map(&mut self, attributes: &Attributes) -> Value {
        let mut map = Map::new();
        for (key, value) in attributes {
            if let Some(json) = self.convert(value) {
                map.insert(key.clone(), json);
            }
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes;
    use crate::core::attributes::SharedObject;
    use crate::core::error_value::ErrorValue;
    use crate::core::formatter::PowertoolsLogFormatter;

    fn to_json(item: &LogItem) -> Value {
        serde_json::from_str(&serialize(item, JsonIndent::COMPACT, &PowertoolsLogFormatter)).unwrap()
    }

    #[test]
    fn test_cyclic_object_is_elided() {
        let node = SharedObject::new(attributes! { "name" => "root" });
        node.insert("self", node.clone());

        let json = to_json(&LogItem::new().with("node", node));
        assert_eq!(json["node"]["name"], "root");
        assert!(json["node"].get("self").is_none());
    }

    #[test]
    fn test_cyclic_array_slot_becomes_null() {
        let node = SharedObject::default();
        node.insert("children", vec![AttributeValue::Object(node.clone())]);

        let json = to_json(&LogItem::new().with("node", node));
        assert_eq!(json["node"]["children"], serde_json::json!([null]));
    }

    #[test]
    fn test_bigint_and_non_finite_floats() {
        let item = LogItem::new()
            .with("big", -(1i128 << 100))
            .with("nan", f64::NAN)
            .with("inf", f64::INFINITY)
            .with("ok", 1.5);

        let json = to_json(&item);
        assert_eq!(json["big"], "-1267650600228229401496703205376");
        assert_eq!(json["nan"], Value::Null);
        assert_eq!(json["inf"], Value::Null);
        assert_eq!(json["ok"], 1.5);
    }

    #[test]
    fn test_error_cause_chain() {
        let err = ErrorValue::new("A", "first")
            .with_cause(ErrorValue::new("B", "second").with_cause(ErrorValue::new("C", "third")));

        let json = to_json(&LogItem::new().with("error", err));
        assert_eq!(json["error"]["name"], "A");
        assert_eq!(json["error"]["cause"]["name"], "B");
        assert_eq!(json["error"]["cause"]["cause"]["message"], "third");
        assert!(json["error"]["cause"]["cause"]["location"]
            .as_str()
            .unwrap()
            .contains("serializer.rs"));
    }

    #[test]
    fn test_key_order_preserved() {
        let item = LogItem::new().with("z", 1).with("a", 2).with("m", 3);
        let line = serialize(&item, JsonIndent::COMPACT, &PowertoolsLogFormatter);
        assert_eq!(line, r#"{"z":1,"a":2,"m":3}"#);
    }

    #[test]
    fn test_pretty_indent() {
        let item = LogItem::new().with("level", "INFO");
        let line = serialize(&item, JsonIndent::PRETTY, &PowertoolsLogFormatter);
        assert_eq!(line, "{\n    \"level\": \"INFO\"\n}");
    }

    #[test]
    fn test_seen_set_is_rebuilt_per_call() {
        let shared = SharedObject::new(attributes! { "k" => 1 });
        let item = LogItem::new().with("shared", shared);

        let first = to_json(&item);
        let second = to_json(&item);
        assert_eq!(first, second);
        assert_eq!(second["shared"]["k"], 1);
    }

    #[test]
    fn test_serialize_value() {
        let value = serialize_value(&AttributeValue::from(vec![1, 2]), &PowertoolsLogFormatter);
        assert_eq!(value, serde_json::json!([1, 2]));
    }
}
