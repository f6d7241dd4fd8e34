//! Main logger implementation
//!
//! A [`Logger`] is built once per process and reused across invocations.
//! The handle is cheap to clone. Clones share level, attributes, appenders
//! and metrics. [`Logger::create_child`] builds an independent logger that
//! starts from a deep copy of the parent's state.

use super::{
    appender::Appender,
    attribute_store::AttributeStore,
    attributes::{deep_clone_attributes, merge_attributes, AttributeValue, Attributes},
    config::{ConfigService, EnvironmentVariablesService, DEFAULT_SERVICE_NAME},
    error::Result,
    formatter::{LogFormatter, PowertoolsLogFormatter},
    lambda_context::{ColdStart, InvocationContext, LambdaContext},
    level_resolver::{platform_mismatch_warning, resolve_log_level},
    log_item::{LogItemExtra, LogItemMessage, LogRecord},
    log_level::LogLevel,
    metrics::LoggerMetrics,
    sampling::{compute_sample_outcome, resolve_sample_rate, SamplerMetrics},
    serializer::{serialize, JsonIndent},
};
use crate::appenders::ConsoleAppender;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

type SharedAppenders = Arc<RwLock<Vec<Box<dyn Appender>>>>;

/// Construction options
///
/// Every field is optional. Unset fields fall back to the configuration
/// service, then the environment, then the built-in defaults.
#[derive(Clone, Default)]
pub struct LoggerOptions {
    pub log_level: Option<String>,
    pub service_name: Option<String>,
    pub sample_rate_value: Option<f64>,
    pub environment: Option<String>,
    pub persistent_log_attributes: Attributes,
    pub log_formatter: Option<Arc<dyn LogFormatter>>,
    pub custom_config_service: Option<Arc<dyn ConfigService>>,
}

impl LoggerOptions {
    /// Layer `other` on top of these options
    ///
    /// Set fields in `other` win. Persistent attributes are deep-merged.
    pub fn overridden_by(self, other: LoggerOptions) -> LoggerOptions {
        let mut persistent_log_attributes = self.persistent_log_attributes;
        merge_attributes(&mut persistent_log_attributes, &other.persistent_log_attributes);

        LoggerOptions {
            log_level: other.log_level.or(self.log_level),
            service_name: other.service_name.or(self.service_name),
            sample_rate_value: other.sample_rate_value.or(self.sample_rate_value),
            environment: other.environment.or(self.environment),
            persistent_log_attributes,
            log_formatter: other.log_formatter.or(self.log_formatter),
            custom_config_service: other.custom_config_service.or(self.custom_config_service),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LevelState {
    /// Threshold in force
    level: LogLevel,
    /// Threshold before any sampling override
    configured: LogLevel,
}

struct LoggerInner {
    state: RwLock<LevelState>,
    store: RwLock<AttributeStore>,
    appenders: SharedAppenders,
    formatter: Arc<dyn LogFormatter>,
    config_service: Option<Arc<dyn ConfigService>>,
    env: EnvironmentVariablesService,
    cold_start: Arc<ColdStart>,
    metrics: LoggerMetrics,
    sampler_metrics: SamplerMetrics,
    log_event: bool,
    indent: JsonIndent,
}

#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    /// Logger configured from the process environment only
    #[must_use]
    pub fn new() -> Self {
        LoggerBuilder::new().build()
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_lambda_logger::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .log_level("DEBUG")
    ///     .service_name("orders")
    ///     .appender(MemoryAppender::new())
    ///     .build();
    /// assert_eq!(logger.level(), LogLevel::Debug);
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Level currently in force
    pub fn level(&self) -> LogLevel {
        self.inner.state.read().level
    }

    pub fn level_name(&self) -> &'static str {
        self.level().to_str()
    }

    /// Change the threshold by name
    ///
    /// Fails with [`LoggerError::InvalidLevel`](super::LoggerError::InvalidLevel)
    /// for names outside the level table. While a platform level is in
    /// force the platform level is kept, and a differing request produces a
    /// warning line instead.
    pub fn set_log_level(&self, name: &str) -> Result<()> {
        if let Some(platform) = self.platform_level() {
            if let Some(requested) = LogLevel::parse_lenient(name) {
                if requested != platform {
                    self.emit(
                        LogLevel::Warn,
                        platform_mismatch_warning(requested, platform).into(),
                        Vec::new(),
                    );
                }
            }
            self.store_level(platform);
            return Ok(());
        }

        let level: LogLevel = name.trim().parse()?;
        self.store_level(level);
        Ok(())
    }

    pub fn set_level(&self, level: LogLevel) -> Result<()> {
        self.set_log_level(level.to_str())
    }

    /// Whether a record at `level` passes the threshold
    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::Silent && level >= self.level()
    }

    pub fn service_name(&self) -> String {
        self.inner.store.read().service_name().to_string()
    }

    pub fn sample_rate_value(&self) -> f64 {
        self.inner.store.read().sample_rate_value()
    }

    #[inline]
    pub fn debug(&self, input: impl Into<LogItemMessage>) {
        self.log(LogLevel::Debug, input);
    }

    #[inline]
    pub fn info(&self, input: impl Into<LogItemMessage>) {
        self.log(LogLevel::Info, input);
    }

    #[inline]
    pub fn warn(&self, input: impl Into<LogItemMessage>) {
        self.log(LogLevel::Warn, input);
    }

    #[inline]
    pub fn error(&self, input: impl Into<LogItemMessage>) {
        self.log(LogLevel::Error, input);
    }

    #[inline]
    pub fn critical(&self, input: impl Into<LogItemMessage>) {
        self.log(LogLevel::Critical, input);
    }

    pub fn debug_with(&self, input: impl Into<LogItemMessage>, extras: Vec<LogItemExtra>) {
        self.log_with(LogLevel::Debug, input, extras);
    }

    pub fn info_with(&self, input: impl Into<LogItemMessage>, extras: Vec<LogItemExtra>) {
        self.log_with(LogLevel::Info, input, extras);
    }

    pub fn warn_with(&self, input: impl Into<LogItemMessage>, extras: Vec<LogItemExtra>) {
        self.log_with(LogLevel::Warn, input, extras);
    }

    pub fn error_with(&self, input: impl Into<LogItemMessage>, extras: Vec<LogItemExtra>) {
        self.log_with(LogLevel::Error, input, extras);
    }

    pub fn critical_with(&self, input: impl Into<LogItemMessage>, extras: Vec<LogItemExtra>) {
        self.log_with(LogLevel::Critical, input, extras);
    }

    pub fn log(&self, level: LogLevel, input: impl Into<LogItemMessage>) {
        self.log_with(level, input, Vec::new());
    }

    /// Log with extra inputs merged after the persistent attributes
    ///
    /// # Example
    /// ```
    /// use rust_lambda_logger::prelude::*;
    /// use rust_lambda_logger::attributes;
    ///
    /// let memory = MemoryAppender::new();
    /// let logger = Logger::builder().appender(memory.clone()).build();
    ///
    /// logger.log_with(
    ///     LogLevel::Info,
    ///     "order placed",
    ///     vec![attributes! { "order_id" => 7 }.into(), "fast lane".into()],
    /// );
    ///
    /// let record = &memory.records()[0];
    /// assert_eq!(record["order_id"], 7);
    /// assert_eq!(record["extra"], "fast lane");
    /// ```
    pub fn log_with(
        &self,
        level: LogLevel,
        input: impl Into<LogItemMessage>,
        extras: Vec<LogItemExtra>,
    ) {
        if !self.is_enabled(level) {
            self.inner.metrics.record_suppressed();
            return;
        }
        self.emit(level, input.into(), extras);
    }

    /// Compose the record a log call would produce, without writing it
    pub fn compose(
        &self,
        level: LogLevel,
        input: impl Into<LogItemMessage>,
        extras: Vec<LogItemExtra>,
    ) -> LogRecord {
        self.inner
            .store
            .read()
            .compose(level, &input.into(), extras, self.inner.env.xray_trace_id())
    }

    /// Attach the context of a new invocation
    ///
    /// Consumes the process-wide cold start flag, so only the first
    /// invocation in the process reports `cold_start: true`.
    pub fn add_context(&self, context: &LambdaContext) {
        let cold_start = self.inner.cold_start.take();
        self.inner.store.write().set_context(InvocationContext {
            cold_start,
            lambda: context.clone(),
        });
    }

    /// Deep-merge attributes into every later record
    pub fn add_persistent_log_attributes(&self, attributes: Attributes) {
        self.inner.store.write().add_persistent(&attributes);
    }

    pub fn append_keys(&self, attributes: Attributes) {
        self.add_persistent_log_attributes(attributes);
    }

    /// Remove persistent keys; unknown keys are ignored
    pub fn remove_persistent_log_attributes<I, K>(&self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        self.inner.store.write().remove_persistent(keys);
    }

    pub fn remove_keys<I, K>(&self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        self.remove_persistent_log_attributes(keys);
    }

    /// Replace the persistent attributes wholesale
    pub fn set_persistent_log_attributes(&self, attributes: Attributes) {
        self.inner.store.write().replace_persistent(attributes);
    }

    /// Deep copy of the persistent attributes
    pub fn persistent_log_attributes(&self) -> Attributes {
        deep_clone_attributes(self.inner.store.read().persistent())
    }

    /// Whether the raw invocation event should be logged
    ///
    /// An explicit override wins over the `POWERTOOLS_LOGGER_LOG_EVENT` flag.
    pub fn should_log_event(&self, overwrite: Option<bool>) -> bool {
        overwrite.unwrap_or(self.inner.log_event)
    }

    /// Log the invocation event at `INFO` under the `event` key
    pub fn log_event_if_enabled<E>(&self, event: &E, overwrite: Option<bool>)
    where
        E: Serialize + ?Sized,
    {
        if !self.should_log_event(overwrite) {
            return;
        }

        let value = match serde_json::to_value(event) {
            Ok(value) => AttributeValue::from(value),
            Err(e) => AttributeValue::String(format!("unserializable event: {}", e)),
        };
        let mut attributes = Attributes::new();
        attributes.insert("event".to_string(), value);
        self.info_with("Lambda invocation event", vec![attributes.into()]);
    }

    /// Roll the sampling dice again
    ///
    /// The configured level is restored first, so a roll that does not
    /// sample undoes an earlier forced `DEBUG`.
    pub fn refresh_sample_rate_calculation(&self) {
        {
            let mut state = self.inner.state.write();
            state.level = state.configured;
        }
        self.roll_sample_rate();
    }

    /// Build an independent logger starting from this one
    ///
    /// The child gets a deep copy of the persistent attributes, the current
    /// invocation context, the same appenders and the same cold start flag.
    /// Level, service, sample rate, environment, formatter and configuration
    /// service are inherited unless `options` sets them.
    pub fn create_child(&self, options: LoggerOptions) -> Logger {
        let (base, context) = {
            let store = self.inner.store.read().fork();
            let base = LoggerOptions {
                log_level: Some(self.inner.state.read().configured.to_str().to_string()),
                service_name: Some(store.service_name().to_string()),
                sample_rate_value: Some(store.sample_rate_value()),
                environment: store.environment().map(str::to_string),
                persistent_log_attributes: store.persistent().clone(),
                log_formatter: Some(Arc::clone(&self.inner.formatter)),
                custom_config_service: self.inner.config_service.clone(),
            };
            (base, store.context().cloned())
        };

        let child = LoggerBuilder::new()
            .options(base.overridden_by(options))
            .environment_variables(self.inner.env.clone())
            .cold_start(Arc::clone(&self.inner.cold_start))
            .shared_appenders(Arc::clone(&self.inner.appenders))
            .build();

        if let Some(context) = context {
            child.inner.store.write().set_context(context);
        }
        child
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.inner.metrics
    }

    pub fn sampler_metrics(&self) -> &SamplerMetrics {
        &self.inner.sampler_metrics
    }

    pub fn flush(&self) -> Result<()> {
        let mut appenders = self.inner.appenders.write();
        for appender in appenders.iter_mut() {
            appender.flush()?;
        }
        Ok(())
    }

    fn platform_level(&self) -> Option<LogLevel> {
        self.inner
            .env
            .aws_log_level()
            .and_then(|level| LogLevel::parse_lenient(&level))
    }

    fn store_level(&self, level: LogLevel) {
        let mut state = self.inner.state.write();
        state.level = level;
        state.configured = level;
    }

    fn roll_sample_rate(&self) {
        let rate = self.sample_rate_value();
        let sampled = compute_sample_outcome(rate);
        self.inner.sampler_metrics.record(sampled);
        if !sampled {
            return;
        }

        // The platform level is never overridden, not even by sampling.
        if self.platform_level().is_none() {
            self.inner.state.write().level = LogLevel::Debug;
        }
        self.debug("Setting log level to DEBUG due to sampling rate");
    }

    /// Compose, format, serialize and write one record, skipping the gate
    fn emit(&self, level: LogLevel, input: LogItemMessage, extras: Vec<LogItemExtra>) {
        let record = self.compose(level, input, extras);
        let mut item = self
            .inner
            .formatter
            .format_attributes(&record.base, &record.attributes);
        item.prepare_for_print();
        let line = serialize(&item, self.inner.indent, self.inner.formatter.as_ref());

        let mut appenders = self.inner.appenders.write();
        Self::process_sync(&mut appenders, level, &line, &self.inner.metrics);
    }

    /// Write a line to every appender with per-appender panic isolation
    ///
    /// A failing appender never prevents the others from receiving the line.
    fn process_sync(
        appenders: &mut [Box<dyn Appender>],
        level: LogLevel,
        line: &str,
        metrics: &LoggerMetrics,
    ) -> bool {
        let mut has_error = false;

        for (idx, appender) in appenders.iter_mut().enumerate() {
            let append_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                appender.append(level, line)
            }));

            match append_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!(
                        "[LOGGER ERROR] Appender #{} ({}) failed: {}",
                        idx,
                        appender.name(),
                        e
                    );
                    metrics.record_appender_failure();
                    has_error = true;
                }
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    eprintln!(
                        "[LOGGER CRITICAL] Appender #{} panicked: {}. \
                         Other appenders continue to function.",
                        idx, panic_msg
                    );
                    metrics.record_appender_failure();
                    has_error = true;
                }
            }
        }

        if !has_error {
            metrics.record_emitted();
        }
        has_error
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("service", &self.service_name())
            .field("sample_rate", &self.sample_rate_value())
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// With no appender configured the logger writes to a [`ConsoleAppender`].
///
/// # Example
/// ```
/// use rust_lambda_logger::prelude::*;
/// use rust_lambda_logger::attributes;
///
/// let logger = Logger::builder()
///     .log_level("WARN")
///     .service_name("payments")
///     .sample_rate_value(0.0)
///     .persistent_log_attributes(attributes! { "team" => "checkout" })
///     .environment_variables(EnvironmentVariablesService::from_vars(Vec::<(String, String)>::new()))
///     .build();
/// assert_eq!(logger.level_name(), "WARN");
/// assert_eq!(logger.service_name(), "payments");
/// ```
pub struct LoggerBuilder {
    options: LoggerOptions,
    appenders: Vec<Box<dyn Appender>>,
    shared_appenders: Option<SharedAppenders>,
    env: Option<EnvironmentVariablesService>,
    cold_start: Option<Arc<ColdStart>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            options: LoggerOptions::default(),
            appenders: Vec::new(),
            shared_appenders: None,
            env: None,
            cold_start: None,
        }
    }

    /// Replace all options at once
    #[must_use = "builder methods return a new value"]
    pub fn options(mut self, options: LoggerOptions) -> Self {
        self.options = options;
        self
    }

    /// Requested level name; invalid names fall through to other sources
    #[must_use = "builder methods return a new value"]
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.options.log_level = Some(level.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn service_name(mut self, service_name: impl Into<String>) -> Self {
        self.options.service_name = Some(service_name.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sample_rate_value(mut self, rate: f64) -> Self {
        self.options.sample_rate_value = Some(rate);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.options.environment = Some(environment.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn persistent_log_attributes(mut self, attributes: Attributes) -> Self {
        merge_attributes(&mut self.options.persistent_log_attributes, &attributes);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_formatter<F: LogFormatter + 'static>(mut self, formatter: F) -> Self {
        self.options.log_formatter = Some(Arc::new(formatter));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn config_service<C: ConfigService + 'static>(mut self, service: C) -> Self {
        self.options.custom_config_service = Some(Arc::new(service));
        self
    }

    /// Add an appender
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    /// Read configuration from this service instead of the process
    /// environment
    #[must_use = "builder methods return a new value"]
    pub fn environment_variables(mut self, env: EnvironmentVariablesService) -> Self {
        self.env = Some(env);
        self
    }

    /// Use this cold start flag instead of the process-wide one
    #[must_use = "builder methods return a new value"]
    pub fn cold_start(mut self, cold_start: Arc<ColdStart>) -> Self {
        self.cold_start = Some(cold_start);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub(crate) fn shared_appenders(mut self, appenders: SharedAppenders) -> Self {
        self.shared_appenders = Some(appenders);
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        let LoggerBuilder {
            options,
            mut appenders,
            shared_appenders,
            env,
            cold_start,
        } = self;

        let env = env.unwrap_or_default();
        let config = options.custom_config_service.clone();
        let config_ref = config.as_deref();

        let resolution = resolve_log_level(
            options.log_level.as_deref(),
            env.aws_log_level().as_deref(),
            config_ref.and_then(|c| c.log_level()).as_deref(),
            env.log_level().as_deref(),
        );

        let service_name = options
            .service_name
            .filter(|name| !name.is_empty())
            .or_else(|| config_ref.and_then(|c| c.service_name()))
            .or_else(|| env.service_name())
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());

        let environment = options
            .environment
            .filter(|name| !name.is_empty())
            .or_else(|| config_ref.and_then(|c| c.current_environment()))
            .or_else(|| env.current_environment());

        let sample_rate = resolve_sample_rate(
            options.sample_rate_value,
            config_ref.and_then(|c| c.sample_rate_value()),
            env.sample_rate_value(),
        );

        let mut store = AttributeStore::new(service_name)
            .with_aws_region(env.aws_region())
            .with_environment(environment);
        store.set_sample_rate_value(sample_rate.rate);
        store.add_persistent(&options.persistent_log_attributes);

        let appenders = shared_appenders.unwrap_or_else(|| {
            if appenders.is_empty() {
                appenders.push(Box::new(ConsoleAppender::new()));
            }
            Arc::new(RwLock::new(appenders))
        });

        // Flags are on when either source turns them on
        let dev_mode = env.is_dev_mode() || config_ref.is_some_and(|c| c.is_dev_mode());
        let log_event = env.log_event() || config_ref.is_some_and(|c| c.log_event());

        let indent = if dev_mode {
            JsonIndent::PRETTY
        } else {
            JsonIndent::COMPACT
        };

        let logger = Logger {
            inner: Arc::new(LoggerInner {
                state: RwLock::new(LevelState {
                    level: resolution.level,
                    configured: resolution.level,
                }),
                store: RwLock::new(store),
                appenders,
                formatter: options
                    .log_formatter
                    .unwrap_or_else(|| Arc::new(PowertoolsLogFormatter::new())),
                config_service: config,
                log_event,
                env,
                cold_start: cold_start.unwrap_or_else(ColdStart::process),
                metrics: LoggerMetrics::new(),
                sampler_metrics: SamplerMetrics::new(),
                indent,
            }),
        };

        // Written past the gate: the level being warned about may hide it.
        if let Some(warning) = resolution.warning {
            logger.emit(LogLevel::Warn, warning.into(), Vec::new());
        }
        logger.roll_sample_rate();

        logger
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
