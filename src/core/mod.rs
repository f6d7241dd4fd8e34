//! Core logger types and traits

pub mod appender;
pub mod attribute_store;
pub mod attributes;
pub mod config;
pub mod error;
pub mod error_value;
pub mod formatter;
pub mod invocation;
pub mod lambda_context;
pub mod level_resolver;
pub mod log_item;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod sampling;
pub mod serializer;

pub use appender::Appender;
pub use attribute_store::AttributeStore;
pub use attributes::{deep_clone_attributes, merge_attributes, AttributeValue, Attributes, SharedObject};
pub use config::{is_value_true, ConfigService, EnvironmentVariablesService, DEFAULT_SERVICE_NAME};
pub use error::{LoggerError, Result};
pub use error_value::ErrorValue;
pub use formatter::{code_location, LogFormatter, PowertoolsLogFormatter};
pub use invocation::{InjectLambdaContext, InjectLambdaContextOptions, InvocationScope};
pub use lambda_context::{ColdStart, InvocationContext, LambdaContext};
pub use level_resolver::{platform_mismatch_warning, resolve_log_level, LevelResolution, LevelSource};
pub use log_item::{LogItem, LogItemExtra, LogItemMessage, LogRecord, UnformattedAttributes};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, LoggerOptions};
pub use metrics::LoggerMetrics;
pub use sampling::{
    compute_sample_outcome, compute_sample_outcome_with, is_valid_sample_rate, resolve_sample_rate,
    SampleRateResolution, SampleRateSource, SamplerMetrics,
};
pub use serializer::{serialize, serialize_value, JsonIndent};
