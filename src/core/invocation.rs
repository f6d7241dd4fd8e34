//! Handler wrapping
//!
//! Per invocation the wrapper runs three steps:
//!
//! - before: snapshot the persistent attributes (when clearing state),
//!   attach the invocation context and optionally log the raw event
//! - around: run the handler and hand back its output untouched
//! - finally: restore the snapshot
//!
//! The restore lives in the `Drop` of [`InvocationScope`], so it also runs
//! when the handler panics or its future is dropped before completion.

use super::attributes::Attributes;
use super::lambda_context::LambdaContext;
use super::logger::Logger;
use serde::Serialize;
use std::future::Future;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InjectLambdaContextOptions {
    /// Restore the persistent attributes once the invocation ends
    pub clear_state: bool,
    /// Log the raw event; `None` defers to `POWERTOOLS_LOGGER_LOG_EVENT`
    pub log_event: Option<bool>,
}

impl InjectLambdaContextOptions {
    #[must_use]
    pub fn clear_state(mut self) -> Self {
        self.clear_state = true;
        self
    }

    #[must_use]
    pub fn log_event(mut self, log_event: bool) -> Self {
        self.log_event = Some(log_event);
        self
    }
}

/// RAII guard for one invocation
///
/// When dropped, restores the persistent attributes captured when the
/// invocation began, if state clearing was requested.
#[must_use = "dropping the scope ends the invocation immediately"]
pub struct InvocationScope {
    logger: Logger,
    snapshot: Option<Attributes>,
}

impl Drop for InvocationScope {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.logger.set_persistent_log_attributes(snapshot);
        }
    }
}

impl Logger {
    /// Run the before step of an invocation and return its scope
    ///
    /// Meant for middleware that drives the handler itself. Keep the scope
    /// alive until the handler is done.
    pub fn begin_invocation<E>(
        &self,
        event: &E,
        context: &LambdaContext,
        options: &InjectLambdaContextOptions,
    ) -> InvocationScope
    where
        E: Serialize + ?Sized,
    {
        let snapshot = options
            .clear_state
            .then(|| self.persistent_log_attributes());

        self.add_context(context);
        self.log_event_if_enabled(event, options.log_event);

        InvocationScope {
            logger: self.clone(),
            snapshot,
        }
    }

    /// Run a synchronous handler inside an invocation scope
    ///
    /// # Example
    /// ```
    /// use rust_lambda_logger::prelude::*;
    /// use rust_lambda_logger::attributes;
    ///
    /// let logger = Logger::builder().appender(MemoryAppender::new()).build();
    /// let context = LambdaContext::new("req-1", "orders");
    /// let options = InjectLambdaContextOptions::default().clear_state();
    ///
    /// let total = logger.with_lambda_context(&(), &context, options, || {
    ///     logger.append_keys(attributes! { "order_id" => 7 });
    ///     21 * 2
    /// });
    ///
    /// assert_eq!(total, 42);
    /// assert!(logger.persistent_log_attributes().is_empty());
    /// ```
    pub fn with_lambda_context<E, F, R>(
        &self,
        event: &E,
        context: &LambdaContext,
        options: InjectLambdaContextOptions,
        f: F,
    ) -> R
    where
        E: Serialize + ?Sized,
        F: FnOnce() -> R,
    {
        let _scope = self.begin_invocation(event, context, &options);
        f()
    }

    /// Wrap an async handler so every call runs inside an invocation scope
    pub fn inject_lambda_context<H>(
        &self,
        handler: H,
        options: InjectLambdaContextOptions,
    ) -> InjectLambdaContext<H> {
        InjectLambdaContext {
            logger: self.clone(),
            handler,
            options,
        }
    }
}

/// An async handler wrapped with invocation context handling
pub struct InjectLambdaContext<H> {
    logger: Logger,
    handler: H,
    options: InjectLambdaContextOptions,
}

impl<H> InjectLambdaContext<H> {
    /// Invoke the handler
    ///
    /// The handler's output, error included, is returned unchanged.
    pub async fn call<E, Fut>(&self, event: E, context: LambdaContext) -> Fut::Output
    where
        H: Fn(E, LambdaContext) -> Fut,
        Fut: Future,
        E: Serialize,
    {
        let _scope = self.logger.begin_invocation(&event, &context, &self.options);
        (self.handler)(event, context).await
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}
