//! Logging macros for ergonomic log message formatting.
//!
//! The level macros format their arguments like `format!` and log the result
//! as the message text. `attributes!` builds an attribute map inline.
//!
//! # Examples
//!
//! ```
//! use rust_lambda_logger::prelude::*;
//! use rust_lambda_logger::{attributes, info};
//!
//! let logger = Logger::builder().appender(MemoryAppender::new()).build();
//!
//! info!(logger, "Server started");
//!
//! let order_id = 42;
//! info!(logger, "Order {} accepted", order_id);
//!
//! logger.append_keys(attributes! { "tenant" => "acme", "retries" => 3 });
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_lambda_logger::prelude::*;
/// # let logger = Logger::builder().appender(MemoryAppender::new()).build();
/// use rust_lambda_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format!($($arg)+))
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_lambda_logger::prelude::*;
/// # let logger = Logger::builder().appender(MemoryAppender::new()).build();
/// use rust_lambda_logger::error;
/// error!(logger, "Failed to reach {}", "inventory");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}

/// Build an [`Attributes`](crate::Attributes) map.
///
/// Values go through `AttributeValue::from`.
///
/// # Examples
///
/// ```
/// use rust_lambda_logger::{attributes, AttributeValue};
///
/// let attrs = attributes! {
///     "id" => 7,
///     "tags" => vec!["new", "priority"],
///     "details" => attributes! { "weight" => 1.5 },
/// };
/// assert_eq!(attrs["id"], AttributeValue::Int(7));
/// ```
#[macro_export]
macro_rules! attributes {
    () => {
        $crate::Attributes::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Attributes::new();
        $(
            map.insert(::std::string::String::from($key), $crate::AttributeValue::from($value));
        )+
        map
    }};
}
