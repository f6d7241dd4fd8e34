//! Log record building blocks
//!
//! A log call passes a primary input (`LogItemMessage`) and any number of
//! extra inputs (`LogItemExtra`). The attribute store turns them into a
//! `LogRecord`. The formatter then lays the record out as an ordered
//! `LogItem` that the serializer writes as one JSON line.

use super::attributes::{merge_value, AttributeValue, Attributes};
use super::error_value::ErrorValue;
use super::lambda_context::InvocationContext;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};

/// Primary input of a log call
#[derive(Debug, Clone, PartialEq)]
pub enum LogItemMessage {
    Text(String),
    /// A map whose `message` key supplies the message text and whose other
    /// keys are merged into the record
    Structured(Attributes),
}

impl LogItemMessage {
    /// The message text; empty for a structured input without a string
    /// `message` key
    pub fn message(&self) -> String {
        match self {
            LogItemMessage::Text(text) => text.clone(),
            LogItemMessage::Structured(attributes) => attributes
                .get("message")
                .and_then(AttributeValue::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Keys merged into the record besides the message text
    pub fn attributes(&self) -> Option<Attributes> {
        match self {
            LogItemMessage::Text(_) => None,
            LogItemMessage::Structured(attributes) => {
                let mut rest = attributes.clone();
                rest.remove("message");
                Some(rest)
            }
        }
    }
}

impl From<&str> for LogItemMessage {
    fn from(text: &str) -> Self {
        LogItemMessage::Text(text.to_string())
    }
}

impl From<String> for LogItemMessage {
    fn from(text: String) -> Self {
        LogItemMessage::Text(text)
    }
}

impl From<&String> for LogItemMessage {
    fn from(text: &String) -> Self {
        LogItemMessage::Text(text.clone())
    }
}

impl From<Attributes> for LogItemMessage {
    fn from(attributes: Attributes) -> Self {
        LogItemMessage::Structured(attributes)
    }
}

/// Extra input of a log call
#[derive(Debug, Clone, PartialEq)]
pub enum LogItemExtra {
    /// Merged as `{ "error": <error> }`
    Error(ErrorValue),
    /// Merged as `{ "extra": <text> }`
    Text(String),
    /// Merged directly
    Attributes(Attributes),
}

impl LogItemExtra {
    pub fn into_attributes(self) -> Attributes {
        match self {
            LogItemExtra::Error(error) => {
                Attributes::from([("error".to_string(), AttributeValue::Error(error))])
            }
            LogItemExtra::Text(text) => {
                Attributes::from([("extra".to_string(), AttributeValue::String(text))])
            }
            LogItemExtra::Attributes(attributes) => attributes,
        }
    }
}

impl From<ErrorValue> for LogItemExtra {
    fn from(error: ErrorValue) -> Self {
        LogItemExtra::Error(error)
    }
}

impl From<&str> for LogItemExtra {
    fn from(text: &str) -> Self {
        LogItemExtra::Text(text.to_string())
    }
}

impl From<String> for LogItemExtra {
    fn from(text: String) -> Self {
        LogItemExtra::Text(text)
    }
}

impl From<Attributes> for LogItemExtra {
    fn from(attributes: Attributes) -> Self {
        LogItemExtra::Attributes(attributes)
    }
}

/// Base fields of a record, before formatting
#[derive(Debug, Clone, PartialEq)]
pub struct UnformattedAttributes {
    pub log_level: LogLevel,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub xray_trace_id: Option<String>,
    pub service_name: String,
    pub aws_region: Option<String>,
    pub environment: Option<String>,
    pub sample_rate_value: f64,
    pub lambda_context: Option<InvocationContext>,
}

/// A composed record: base fields plus merged attributes
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub base: UnformattedAttributes,
    pub attributes: Attributes,
}

/// Formatted record with a stable key order
///
/// Keys keep the position of their first insertion. Re-inserting a key
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogItem {
    entries: Vec<(String, AttributeValue)>,
}

impl LogItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, builder style
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Deep-merge attributes on top of the current entries
    pub fn add_attributes(&mut self, attributes: &Attributes) {
        for (key, incoming) in attributes {
            let merged = merge_value(self.get(key), incoming);
            self.set(key.clone(), merged);
        }
    }

    /// Drop top-level entries that are null or an empty string
    pub fn prepare_for_print(&mut self) {
        self.entries.retain(|(_, value)| match value {
            AttributeValue::Null => false,
            AttributeValue::String(s) => !s.is_empty(),
            _ => true,
        });
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.position(key).map(|index| &self.entries[index].1)
    }

    pub fn entries(&self) -> &[(String, AttributeValue)] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}
