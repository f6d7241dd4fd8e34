//! Record formatting
//!
//! A [`LogFormatter`] decides which keys a record carries and in what order.
//! Only [`format_attributes`](LogFormatter::format_attributes) is required.
//! Error, timestamp and code location formatting have defaults that custom
//! formatters can reuse or override.

use super::attributes::{AttributeValue, Attributes};
use super::error_value::ErrorValue;
use super::log_item::{LogItem, UnformattedAttributes};
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// `(file:line:col)` at the end of a stack line
static PAREN_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((.*):(\d+):(\d+)\)\\?$").expect("invalid regex"));

/// `at file:line:col` as produced for Rust call sites
static AT_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*at (.*):(\d+):(\d+)$").expect("invalid regex"));

pub trait LogFormatter: Send + Sync {
    /// Lay out base fields and merged attributes as an ordered item
    fn format_attributes(
        &self,
        attributes: &UnformattedAttributes,
        additional: &Attributes,
    ) -> LogItem;

    /// Expand an error into name, location, message, stack and cause
    ///
    /// Error-typed causes are formatted recursively.
    fn format_error(&self, error: &ErrorValue) -> Attributes {
        let mut formatted = Attributes::new();
        formatted.insert("name".to_string(), error.name().into());
        formatted.insert(
            "location".to_string(),
            self.get_code_location(error.stack()).into(),
        );
        formatted.insert("message".to_string(), error.message().into());
        if let Some(stack) = error.stack() {
            formatted.insert("stack".to_string(), stack.into());
        }
        if let Some(cause) = error.cause() {
            let cause = match cause {
                AttributeValue::Error(inner) => AttributeValue::object(self.format_error(inner)),
                other => other.clone(),
            };
            formatted.insert("cause".to_string(), cause);
        }
        formatted
    }

    /// ISO-8601 in UTC with millisecond precision
    fn format_timestamp(&self, now: &DateTime<Utc>) -> String {
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn get_code_location(&self, stack: Option<&str>) -> String {
        code_location(stack)
    }
}

/// `file:line` of the first stack line naming a location, or `""`
///
/// # Example
///
/// ```
/// use rust_lambda_logger::core::code_location;
///
/// let stack = "Error: boom\n    at handler (/var/task/index.js:12:7)";
/// assert_eq!(code_location(Some(stack)), "/var/task/index.js:12");
/// assert_eq!(code_location(Some("no location here")), "");
/// ```
pub fn code_location(stack: Option<&str>) -> String {
    let Some(stack) = stack else {
        return String::new();
    };

    stack
        .lines()
        .find_map(|line| {
            PAREN_LOCATION
                .captures(line)
                .or_else(|| AT_LOCATION.captures(line))
        })
        .map(|captures| {
            let file = &captures[1];
            // Numeric parse drops leading zeros
            match captures[2].parse::<u64>() {
                Ok(line) => format!("{}:{}", file, line),
                Err(_) => format!("{}:{}", file, &captures[2]),
            }
        })
        .unwrap_or_default()
}

/// Default formatter producing the standard key layout
#[derive(Debug, Clone, Copy, Default)]
pub struct PowertoolsLogFormatter;

impl PowertoolsLogFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl LogFormatter for PowertoolsLogFormatter {
    fn format_attributes(
        &self,
        attributes: &UnformattedAttributes,
        additional: &Attributes,
    ) -> LogItem {
        let context = attributes.lambda_context.as_ref();

        let mut item = LogItem::new()
            .with("cold_start", context.map(|c| c.cold_start))
            .with(
                "function_arn",
                context.map(|c| c.lambda.invoked_function_arn.as_str()),
            )
            .with(
                "function_memory_size",
                context.map(|c| c.lambda.memory_limit_in_mb),
            )
            .with("function_name", context.map(|c| c.lambda.function_name.as_str()))
            .with(
                "function_request_id",
                context.map(|c| c.lambda.aws_request_id.as_str()),
            )
            .with("level", attributes.log_level.to_str())
            .with("message", attributes.message.as_str())
            .with("sampling_rate", attributes.sample_rate_value)
            .with("service", attributes.service_name.as_str())
            .with("timestamp", self.format_timestamp(&attributes.timestamp))
            .with("xray_trace_id", attributes.xray_trace_id.as_deref())
            .with("aws_region", attributes.aws_region.as_deref())
            .with("environment", attributes.environment.as_deref());

        item.add_attributes(additional);
        item
    }
}
