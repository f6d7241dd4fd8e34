//! Invocation context supplied by the function platform

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Identifying data the platform hands to every invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaContext {
    pub function_name: String,
    pub function_version: String,
    pub invoked_function_arn: String,
    #[serde(rename = "memoryLimitInMB")]
    pub memory_limit_in_mb: u32,
    pub aws_request_id: String,
}

impl LambdaContext {
    pub fn new(aws_request_id: impl Into<String>, function_name: impl Into<String>) -> Self {
        Self {
            aws_request_id: aws_request_id.into(),
            function_name: function_name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_function_version(mut self, version: impl Into<String>) -> Self {
        self.function_version = version.into();
        self
    }

    #[must_use]
    pub fn with_invoked_function_arn(mut self, arn: impl Into<String>) -> Self {
        self.invoked_function_arn = arn.into();
        self
    }

    #[must_use]
    pub fn with_memory_limit_in_mb(mut self, memory: u32) -> Self {
        self.memory_limit_in_mb = memory;
        self
    }
}

/// Context attached to every record of one invocation
///
/// Replaced wholesale when the next invocation begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub cold_start: bool,
    pub lambda: LambdaContext,
}

/// Write-once cold start flag
///
/// Starts out `true`; the first [`take`](ColdStart::take) returns `true` and
/// every later call returns `false`.
#[derive(Debug)]
pub struct ColdStart(AtomicBool);

impl ColdStart {
    pub const fn new() -> Self {
        Self(AtomicBool::new(true))
    }

    /// The flag shared by every logger in this process
    pub fn process() -> Arc<ColdStart> {
        static PROCESS_COLD_START: OnceLock<Arc<ColdStart>> = OnceLock::new();
        Arc::clone(PROCESS_COLD_START.get_or_init(|| Arc::new(ColdStart::new())))
    }

    /// Consume the flag, returning whether this was the cold start
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    /// Peek at the flag without consuming it
    pub fn is_cold(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for ColdStart {
    fn default() -> Self {
        Self::new()
    }
}
