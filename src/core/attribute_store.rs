//! Persistent and per-invocation record state
//!
//! The store owns everything that outlives a single log call: persistent
//! attributes, the current invocation context, and the static base fields
//! (service, region, environment, sample rate). [`AttributeStore::compose`]
//! builds a fresh record from that state for each accepted call.
//!
//! Merge order, later wins: persistent attributes, the structured message
//! object, then each extra input in call order.

use super::attributes::{deep_clone_attributes, merge_attributes, Attributes};
use super::lambda_context::InvocationContext;
use super::log_item::{LogItemExtra, LogItemMessage, LogRecord, UnformattedAttributes};
use super::log_level::LogLevel;
use chrono::Utc;

#[derive(Debug, Clone, Default)]
pub struct AttributeStore {
    persistent: Attributes,
    context: Option<InvocationContext>,
    service_name: String,
    aws_region: Option<String>,
    environment: Option<String>,
    sample_rate_value: f64,
}

impl AttributeStore {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_aws_region(mut self, region: Option<String>) -> Self {
        self.aws_region = region;
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: Option<String>) -> Self {
        self.environment = environment;
        self
    }

    /// Deep-merge into the persistent attributes
    ///
    /// The input is copied first, so objects the caller still holds never
    /// alias stored state.
    pub fn add_persistent(&mut self, attributes: &Attributes) {
        merge_attributes(&mut self.persistent, &deep_clone_attributes(attributes));
    }

    /// Remove persistent keys; unknown keys are ignored
    pub fn remove_persistent<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            self.persistent.remove(key.as_ref());
        }
    }

    /// Replace the persistent attributes wholesale
    pub fn replace_persistent(&mut self, attributes: Attributes) {
        self.persistent = deep_clone_attributes(&attributes);
    }

    pub fn persistent(&self) -> &Attributes {
        &self.persistent
    }

    /// Attach the context of a new invocation, replacing the previous one
    pub fn set_context(&mut self, context: InvocationContext) {
        self.context = Some(context);
    }

    pub fn context(&self) -> Option<&InvocationContext> {
        self.context.as_ref()
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    pub fn set_sample_rate_value(&mut self, rate: f64) {
        self.sample_rate_value = rate;
    }

    pub fn sample_rate_value(&self) -> f64 {
        self.sample_rate_value
    }

    /// Build the record for one log call
    pub fn compose(
        &self,
        level: LogLevel,
        input: &LogItemMessage,
        extras: Vec<LogItemExtra>,
        xray_trace_id: Option<String>,
    ) -> LogRecord {
        let base = UnformattedAttributes {
            log_level: level,
            timestamp: Utc::now(),
            message: input.message(),
            xray_trace_id,
            service_name: self.service_name.clone(),
            aws_region: self.aws_region.clone(),
            environment: self.environment.clone(),
            sample_rate_value: self.sample_rate_value,
            lambda_context: self.context.clone(),
        };

        let mut attributes = self.persistent.clone();
        if let Some(structured) = input.attributes() {
            merge_attributes(&mut attributes, &structured);
        }
        for extra in extras {
            merge_attributes(&mut attributes, &extra.into_attributes());
        }

        LogRecord { base, attributes }
    }

    /// Independent copy whose persistent attributes share no objects with
    /// this store
    pub fn fork(&self) -> Self {
        Self {
            persistent: deep_clone_attributes(&self.persistent),
            ..self.clone()
        }
    }
}
