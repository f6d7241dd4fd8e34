//! # Rust Lambda Logger
//!
//! Structured JSON logging for serverless function handlers.
//!
//! ## Features
//!
//! - **Level Precedence**: platform, explicit, configuration and environment
//!   sources resolved in a fixed order
//! - **Debug Sampling**: a configurable share of instances logs at `DEBUG`
//! - **Invocation Context**: request id, function metadata and cold start on
//!   every record, with scoped persistent attributes
//! - **Safe Serialization**: cyclic objects, big integers and error cause
//!   chains never fail a log call
//!
//! ## Example
//!
//! ```
//! use rust_lambda_logger::prelude::*;
//! use rust_lambda_logger::attributes;
//!
//! let memory = MemoryAppender::new();
//! let logger = Logger::builder()
//!     .service_name("orders")
//!     .appender(memory.clone())
//!     .build();
//!
//! logger.append_keys(attributes! { "tenant" => "acme" });
//! logger.info("order placed");
//!
//! let record = &memory.records()[0];
//! assert_eq!(record["service"], "orders");
//! assert_eq!(record["tenant"], "acme");
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, MemoryAppender};
    pub use crate::core::{
        Appender, AttributeValue, Attributes, ConfigService, EnvironmentVariablesService,
        ErrorValue, InjectLambdaContextOptions, LambdaContext, LogFormatter, LogItemExtra,
        LogItemMessage, LogLevel, Logger, LoggerBuilder, LoggerError, LoggerMetrics, LoggerOptions,
        PowertoolsLogFormatter, Result, SharedObject,
    };
}

pub use appenders::{ConsoleAppender, MemoryAppender};
pub use core::{
    Appender, AttributeValue, Attributes, ConfigService, EnvironmentVariablesService, ErrorValue,
    InjectLambdaContextOptions, LambdaContext, LogFormatter, LogItemExtra, LogItemMessage,
    LogLevel, Logger, LoggerBuilder, LoggerError, LoggerMetrics, LoggerOptions,
    PowertoolsLogFormatter, Result, SharedObject,
};
