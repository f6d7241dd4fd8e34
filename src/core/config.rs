//! Configuration sources for the logger
//!
//! The logger reads a handful of named settings: level, sample rate, service
//! name, environment, event logging and dev mode. They come from an optional
//! custom [`ConfigService`] and from the runtime environment via
//! [`EnvironmentVariablesService`]. Values are untrusted: unparsable ones
//! read as absent.

use std::collections::HashMap;

/// Names of the variables the logger understands
pub mod vars {
    pub const AWS_LAMBDA_LOG_LEVEL: &str = "AWS_LAMBDA_LOG_LEVEL";
    pub const AWS_REGION: &str = "AWS_REGION";
    pub const CURRENT_ENVIRONMENT: &str = "ENVIRONMENT";
    pub const DEV_MODE: &str = "POWERTOOLS_DEV";
    pub const LOG_EVENT: &str = "POWERTOOLS_LOGGER_LOG_EVENT";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const SAMPLE_RATE: &str = "POWERTOOLS_LOGGER_SAMPLE_RATE";
    pub const SERVICE_NAME: &str = "POWERTOOLS_SERVICE_NAME";
    pub const XRAY_TRACE_ID: &str = "_X_AMZN_TRACE_ID";
}

/// Service name used when no source supplies one
pub const DEFAULT_SERVICE_NAME: &str = "service_undefined";

/// Whether a configuration string reads as "true"
pub fn is_value_true(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "y" | "yes" | "t" | "true" | "on"
    )
}

/// Read access to named configuration values
///
/// Only [`get`](ConfigService::get) is required. The typed accessors parse
/// its output and treat anything unparsable as absent.
pub trait ConfigService: Send + Sync {
    /// Raw value of a named setting; `None` when unset
    fn get(&self, name: &str) -> Option<String>;

    fn log_level(&self) -> Option<String> {
        self.get(vars::LOG_LEVEL)
    }

    fn sample_rate_value(&self) -> Option<f64> {
        self.get(vars::SAMPLE_RATE)
            .and_then(|value| value.trim().parse::<f64>().ok())
    }

    fn service_name(&self) -> Option<String> {
        self.get(vars::SERVICE_NAME)
    }

    fn current_environment(&self) -> Option<String> {
        self.get(vars::CURRENT_ENVIRONMENT)
    }

    fn log_event(&self) -> bool {
        self.get(vars::LOG_EVENT).is_some_and(|value| is_value_true(&value))
    }

    fn is_dev_mode(&self) -> bool {
        self.get(vars::DEV_MODE).is_some_and(|value| is_value_true(&value))
    }
}

#[derive(Debug, Clone)]
enum VariableSource {
    Process,
    Fixed(HashMap<String, String>),
}

/// Configuration read from environment variables
///
/// Reads the process environment by default. [`from_vars`] pins a fixed set
/// of variables instead, which keeps tests independent of the process.
///
/// [`from_vars`]: EnvironmentVariablesService::from_vars
///
/// # Example
///
/// ```
/// use rust_lambda_logger::core::{ConfigService, EnvironmentVariablesService};
///
/// let env = EnvironmentVariablesService::from_vars([
///     ("LOG_LEVEL", "debug"),
///     ("POWERTOOLS_LOGGER_SAMPLE_RATE", "0.25"),
/// ]);
/// assert_eq!(env.log_level().as_deref(), Some("debug"));
/// assert_eq!(env.sample_rate_value(), Some(0.25));
/// ```
#[derive(Debug, Clone)]
pub struct EnvironmentVariablesService {
    source: VariableSource,
}

impl EnvironmentVariablesService {
    /// Read from the process environment
    pub fn new() -> Self {
        Self {
            source: VariableSource::Process,
        }
    }

    /// Read from a fixed set of variables
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            source: VariableSource::Fixed(
                vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            ),
        }
    }

    pub fn aws_region(&self) -> Option<String> {
        self.get(vars::AWS_REGION)
    }

    /// Minimum level enforced by the platform, translated into the
    /// logger's own level names
    pub fn aws_log_level(&self) -> Option<String> {
        self.get(vars::AWS_LAMBDA_LOG_LEVEL)
            .map(|level| match level.trim().to_uppercase().as_str() {
                "FATAL" => "CRITICAL".to_string(),
                "TRACE" => "DEBUG".to_string(),
                other => other.to_string(),
            })
    }

    /// The `Root` segment of the X-Ray trace header
    pub fn xray_trace_id(&self) -> Option<String> {
        let header = self.get(vars::XRAY_TRACE_ID)?;
        header
            .split(';')
            .find_map(|segment| segment.trim().strip_prefix("Root="))
            .filter(|root| !root.is_empty())
            .map(str::to_string)
    }
}

impl Default for EnvironmentVariablesService {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigService for EnvironmentVariablesService {
    fn get(&self, name: &str) -> Option<String> {
        let value = match &self.source {
            VariableSource::Process => std::env::var(name).ok(),
            VariableSource::Fixed(vars) => vars.get(name).cloned(),
        };
        value.filter(|v| !v.is_empty())
    }
}
