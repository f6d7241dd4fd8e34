//! Logger metrics for observability
//!
//! In-process counters describing what the logger did with each call: how
//! many records reached every appender, how many calls the level gate
//! suppressed, and how many appender writes failed.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use rust_lambda_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_emitted();
/// metrics.record_suppressed();
/// metrics.record_suppressed();
///
/// assert_eq!(metrics.emitted_count(), 1);
/// assert_eq!(metrics.suppressed_count(), 2);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records every appender accepted
    emitted: AtomicU64,

    /// Calls below the active threshold
    suppressed: AtomicU64,

    /// Appender writes that returned an error or panicked
    appender_failures: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            emitted: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
            appender_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn emitted_count(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn appender_failures(&self) -> u64 {
        self.appender_failures.load(Ordering::Relaxed)
    }

    /// Record an emitted record, returning the previous count
    #[inline]
    pub fn record_emitted(&self) -> u64 {
        self.emitted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_suppressed(&self) -> u64 {
        self.suppressed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_appender_failure(&self) -> u64 {
        self.appender_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of calls that were suppressed, as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no calls have been made.
    pub fn suppression_rate(&self) -> f64 {
        let suppressed = self.suppressed_count() as f64;
        let total = self.emitted_count() as f64 + suppressed;
        if total == 0.0 {
            0.0
        } else {
            (suppressed / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.emitted.store(0, Ordering::Relaxed);
        self.suppressed.store(0, Ordering::Relaxed);
        self.appender_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            emitted: AtomicU64::new(self.emitted_count()),
            suppressed: AtomicU64::new(self.suppressed_count()),
            appender_failures: AtomicU64::new(self.appender_failures()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.emitted_count(), 0);
        assert_eq!(metrics.suppressed_count(), 0);
        assert_eq!(metrics.appender_failures(), 0);
    }

    #[test]
    fn test_record_returns_previous_value() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_emitted(), 0);
        assert_eq!(metrics.record_emitted(), 1);
        assert_eq!(metrics.emitted_count(), 2);
    }

    #[test]
    fn test_suppression_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.suppression_rate(), 0.0);

        for _ in 0..3 {
            metrics.record_emitted();
        }
        metrics.record_suppressed();
        assert_eq!(metrics.suppression_rate(), 25.0);
    }

    #[test]
    fn test_reset_and_snapshot() {
        let metrics = LoggerMetrics::new();
        metrics.record_emitted();
        metrics.record_appender_failure();

        let snapshot = metrics.clone();
        metrics.reset();

        assert_eq!(metrics.emitted_count(), 0);
        assert_eq!(snapshot.emitted_count(), 1);
        assert_eq!(snapshot.appender_failures(), 1);
    }
}
