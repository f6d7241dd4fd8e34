//! Appender trait for log output destinations

use super::{error::Result, log_level::LogLevel};

/// Sink receiving one formatted line per accepted log call
///
/// The level is passed alongside the line so sinks can route by severity.
pub trait Appender: Send + Sync {
    fn append(&mut self, level: LogLevel, line: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
