//! Structured attribute values and the deep-merge rules used to compose
//! log records
//!
//! This module provides:
//! - `AttributeValue`: a structured value attached to a log record
//! - `SharedObject`: a reference-counted map with identity, so repeated
//!   references and cycles can be expressed
//! - `merge_attributes` / `deep_clone_attributes`: the merge and copy
//!   primitives used by the attribute store

use super::error_value::ErrorValue;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// String-keyed attribute map
pub type Attributes = BTreeMap<String, AttributeValue>;

/// Value type for structured logging attributes
#[derive(Debug, Clone)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Integer outside the range JSON numbers carry losslessly
    BigInt(i128),
    String(String),
    Array(Vec<AttributeValue>),
    Object(SharedObject),
    Error(ErrorValue),
}

impl AttributeValue {
    /// Wrap a map into a new shared object
    pub fn object(attributes: Attributes) -> Self {
        AttributeValue::Object(SharedObject::new(attributes))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            AttributeValue::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&SharedObject> {
        match self {
            AttributeValue::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

/// Objects compare by identity first, then structurally. A pair of objects
/// already under comparison higher up counts as equal, so cyclic graphs
/// compare without unbounded recursion.
impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        let mut active = Vec::new();
        values_eq(self, other, &mut active)
    }
}

fn values_eq(a: &AttributeValue, b: &AttributeValue, active: &mut Vec<(usize, usize)>) -> bool {
    use AttributeValue::*;
    match (a, b) {
        (Null, Null) => true,
        (Bool(a), Bool(b)) => a == b,
        (Int(a), Int(b)) => a == b,
        (UInt(a), UInt(b)) => a == b,
        (Int(a), UInt(b)) | (UInt(b), Int(a)) => i64::try_from(*b).is_ok_and(|b| *a == b),
        (Float(a), Float(b)) => a == b,
        (BigInt(a), BigInt(b)) => a == b,
        (String(a), String(b)) => a == b,
        (Array(a), Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_eq(x, y, active))
        }
        (Object(a), Object(b)) => objects_eq(a, b, active),
        (Error(a), Error(b)) => a == b,
        _ => false,
    }
}

fn objects_eq(a: &SharedObject, b: &SharedObject, active: &mut Vec<(usize, usize)>) -> bool {
    let pair = (a.id(), b.id());
    if a.ptr_eq(b) || active.contains(&pair) {
        return true;
    }

    let (left, right) = (a.snapshot(), b.snapshot());
    if left.len() != right.len() {
        return false;
    }

    active.push(pair);
    let equal = left.iter().all(|(key, value)| {
        right
            .get(key)
            .is_some_and(|other| values_eq(value, other, active))
    });
    active.pop();
    equal
}

/// Reference-counted attribute map with identity
///
/// Cloning a `SharedObject` clones the reference, not the map. Two clones
/// share the same identity, which is what the serializer uses to detect
/// cycles.
///
/// # Example
///
/// ```
/// use rust_lambda_logger::core::{AttributeValue, SharedObject};
///
/// let node = SharedObject::default();
/// node.insert("name", "root");
/// node.insert("self", AttributeValue::Object(node.clone()));
/// assert_eq!(node.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct SharedObject(Arc<RwLock<Attributes>>);

impl SharedObject {
    pub fn new(attributes: Attributes) -> Self {
        Self(Arc::new(RwLock::new(attributes)))
    }

    /// Identity of the underlying map
    #[inline]
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    #[inline]
    pub fn ptr_eq(&self, other: &SharedObject) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn insert<K, V>(&self, key: K, value: V) -> Option<AttributeValue>
    where
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        self.0.write().insert(key.into(), value.into())
    }

    pub fn remove(&self, key: &str) -> Option<AttributeValue> {
        self.0.write().remove(key)
    }

    pub fn get(&self, key: &str) -> Option<AttributeValue> {
        self.0.read().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Shallow copy of the current entries
    ///
    /// Nested objects in the copy still share identity with the original.
    pub fn snapshot(&self) -> Attributes {
        self.0.read().clone()
    }
}

impl fmt::Debug for SharedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Entries are not printed: the map may contain itself.
        f.debug_struct("SharedObject")
            .field("id", &format_args!("{:#x}", self.id()))
            .field("len", &self.len())
            .finish()
    }
}

/// Deep-merge `source` into `target`
///
/// Later keys override earlier ones at the leaf level. Nested maps merge
/// recursively, arrays and primitives are replaced wholesale. Shared objects
/// are never mutated: merging two maps produces a new object.
///
/// # Example
///
/// ```
/// use rust_lambda_logger::attributes;
/// use rust_lambda_logger::core::{merge_attributes, AttributeValue};
///
/// let mut target = attributes! { "a" => 1, "b" => 1 };
/// merge_attributes(&mut target, &attributes! { "b" => 2 });
/// assert_eq!(target["a"], AttributeValue::Int(1));
/// assert_eq!(target["b"], AttributeValue::Int(2));
/// ```
pub fn merge_attributes(target: &mut Attributes, source: &Attributes) {
    let mut active = Vec::new();
    merge_level(target, source, &mut active);
}

/// Merge a single incoming value on top of an optional existing one
pub(crate) fn merge_value(
    existing: Option<&AttributeValue>,
    incoming: &AttributeValue,
) -> AttributeValue {
    let mut active = Vec::new();
    merge_pair(existing, incoming, &mut active)
}

fn merge_level(target: &mut Attributes, source: &Attributes, active: &mut Vec<(usize, usize)>) {
    for (key, incoming) in source {
        let merged = merge_pair(target.get(key), incoming, active);
        target.insert(key.clone(), merged);
    }
}

fn merge_pair(
    existing: Option<&AttributeValue>,
    incoming: &AttributeValue,
    active: &mut Vec<(usize, usize)>,
) -> AttributeValue {
    match (existing, incoming) {
        (Some(AttributeValue::Object(dst)), AttributeValue::Object(src)) => {
            // A pair already being merged higher up the stack is a cycle.
            let pair = (dst.id(), src.id());
            if dst.ptr_eq(src) || active.contains(&pair) {
                return incoming.clone();
            }

            active.push(pair);
            let mut combined = dst.snapshot();
            merge_level(&mut combined, &src.snapshot(), active);
            active.pop();

            AttributeValue::object(combined)
        }
        _ => incoming.clone(),
    }
}

/// Deep copy an attribute map
///
/// Every reachable shared object is copied once. Cycles and repeated
/// references in the source are reproduced in the copy, so the copy never
/// shares identity with the original.
pub fn deep_clone_attributes(attributes: &Attributes) -> Attributes {
    let mut copies = HashMap::new();
    attributes
        .iter()
        .map(|(key, value)| (key.clone(), deep_clone_value(value, &mut copies)))
        .collect()
}

fn deep_clone_value(value: &AttributeValue, copies: &mut HashMap<usize, SharedObject>) -> AttributeValue {
    match value {
        AttributeValue::Object(obj) => {
            if let Some(copy) = copies.get(&obj.id()) {
                return AttributeValue::Object(copy.clone());
            }

            let copy = SharedObject::default();
            copies.insert(obj.id(), copy.clone());
            for (key, child) in obj.snapshot() {
                let cloned = deep_clone_value(&child, copies);
                copy.insert(key, cloned);
            }
            AttributeValue::Object(copy)
        }
        AttributeValue::Array(items) => {
            AttributeValue::Array(items.iter().map(|item| deep_clone_value(item, copies)).collect())
        }
        other => other.clone(),
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<&String> for AttributeValue {
    fn from(s: &String) -> Self {
        AttributeValue::String(s.clone())
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<i32> for AttributeValue {
    fn from(i: i32) -> Self {
        AttributeValue::Int(i64::from(i))
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Int(i)
    }
}

impl From<u32> for AttributeValue {
    fn from(u: u32) -> Self {
        AttributeValue::Int(i64::from(u))
    }
}

impl From<u64> for AttributeValue {
    fn from(u: u64) -> Self {
        AttributeValue::UInt(u)
    }
}

impl From<usize> for AttributeValue {
    fn from(u: usize) -> Self {
        AttributeValue::UInt(u as u64)
    }
}

impl From<i128> for AttributeValue {
    fn from(i: i128) -> Self {
        AttributeValue::BigInt(i)
    }
}

impl From<f64> for AttributeValue {
    fn from(f: f64) -> Self {
        AttributeValue::Float(f)
    }
}

impl From<ErrorValue> for AttributeValue {
    fn from(error: ErrorValue) -> Self {
        AttributeValue::Error(error)
    }
}

impl From<SharedObject> for AttributeValue {
    fn from(obj: SharedObject) -> Self {
        AttributeValue::Object(obj)
    }
}

impl From<Attributes> for AttributeValue {
    fn from(attributes: Attributes) -> Self {
        AttributeValue::object(attributes)
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(items: Vec<T>) -> Self {
        AttributeValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttributeValue::Null, Into::into)
    }
}

impl From<serde_json::Value> for AttributeValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => AttributeValue::Null,
            serde_json::Value::Bool(b) => AttributeValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    AttributeValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    AttributeValue::UInt(u)
                } else {
                    n.as_f64().map_or(AttributeValue::Null, AttributeValue::Float)
                }
            }
            serde_json::Value::String(s) => AttributeValue::String(s),
            serde_json::Value::Array(items) => {
                AttributeValue::Array(items.into_iter().map(AttributeValue::from).collect())
            }
            serde_json::Value::Object(map) => AttributeValue::object(
                map.into_iter()
                    .map(|(key, value)| (key, AttributeValue::from(value)))
                    .collect(),
            ),
        }
    }
}
