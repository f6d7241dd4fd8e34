//! Error values carried inside log records

use super::attributes::AttributeValue;
use std::panic::Location;

/// An error attached to a log record
///
/// Holds the pieces the formatter needs: a name, a message, optional stack
/// text and an optional cause. The cause is any attribute value, usually
/// another `ErrorValue`, so cause chains nest naturally.
///
/// # Example
///
/// ```
/// use rust_lambda_logger::core::ErrorValue;
///
/// let root = ErrorValue::new("TimeoutError", "upstream timed out");
/// let err = ErrorValue::new("FetchError", "could not load order").with_cause(root);
/// assert_eq!(err.cause_chain().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorValue {
    name: String,
    message: String,
    stack: Option<String>,
    cause: Option<Box<AttributeValue>>,
}

impl ErrorValue {
    /// Create an error whose stack points at the caller
    #[track_caller]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        let message = message.into();
        let stack = Some(caller_stack(&name, &message, Location::caller()));
        Self {
            name,
            message,
            stack,
            cause: None,
        }
    }

    /// Build from a standard error, following its `source()` chain
    ///
    /// The outer error is named after its type and gets a stack pointing at
    /// the caller. Sources become nested causes named `Error`.
    #[track_caller]
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let mut sources = Vec::new();
        let mut next = error.source();
        while let Some(source) = next {
            sources.push(source.to_string());
            next = source.source();
        }

        let cause = sources.into_iter().rev().fold(None, |cause, message| {
            Some(Box::new(AttributeValue::Error(ErrorValue {
                name: "Error".to_string(),
                message,
                stack: None,
                cause,
            })))
        });

        let mut value = Self::new(short_type_name::<E>(), error.to_string());
        value.cause = cause;
        value
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    #[must_use]
    pub fn without_stack(mut self) -> Self {
        self.stack = None;
        self
    }

    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<AttributeValue>) -> Self {
        self.cause = Some(Box::new(cause.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    pub fn cause(&self) -> Option<&AttributeValue> {
        self.cause.as_deref()
    }

    /// This error followed by every error-typed cause beneath it
    pub fn cause_chain(&self) -> impl Iterator<Item = &ErrorValue> {
        std::iter::successors(Some(self), |&err| match err.cause() {
            Some(AttributeValue::Error(inner)) => Some(inner),
            _ => None,
        })
    }
}

fn caller_stack(name: &str, message: &str, location: &Location<'_>) -> String {
    format!(
        "{}: {}\n    at {}:{}:{}",
        name,
        message,
        location.file(),
        location.line(),
        location.column()
    )
}

fn short_type_name<E: ?Sized>() -> String {
    let full = std::any::type_name::<E>();
    // `dyn Error + Send + Sync` names the principal trait first
    let base = full.split('<').next().unwrap_or(full);
    let base = base.split(" + ").next().unwrap_or(base);
    base.rsplit("::")
        .next()
        .unwrap_or(base)
        .trim_start_matches("dyn ")
        .to_string()
}
