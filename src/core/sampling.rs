//! Debug sampling
//!
//! A small share of warm instances can log at `DEBUG` without raising
//! verbosity everywhere. Each logger rolls once at construction, and again on
//! every explicit refresh. When the roll succeeds, the threshold is forced to
//! `DEBUG` until the next refresh.
//!
//! Rate precedence mirrors level resolution: explicit value, then the
//! configuration service, then the environment, then `0`. Only values inside
//! `[0, 1]` count. A valid `0` ends the search.

use rand::rngs::OsRng;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

/// Where the resolved sample rate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRateSource {
    Explicit,
    Config,
    Environment,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRateResolution {
    pub rate: f64,
    pub source: SampleRateSource,
}

#[inline]
pub fn is_valid_sample_rate(rate: f64) -> bool {
    (0.0..=1.0).contains(&rate)
}

/// Pick the first valid rate from the candidate sources
///
/// # Example
///
/// ```
/// use rust_lambda_logger::core::{resolve_sample_rate, SampleRateSource};
///
/// let resolution = resolve_sample_rate(Some(4.0), Some(0.0), Some(0.5));
/// assert_eq!(resolution.rate, 0.0);
/// assert_eq!(resolution.source, SampleRateSource::Config);
/// ```
pub fn resolve_sample_rate(
    explicit: Option<f64>,
    config: Option<f64>,
    env: Option<f64>,
) -> SampleRateResolution {
    [
        (explicit, SampleRateSource::Explicit),
        (config, SampleRateSource::Config),
        (env, SampleRateSource::Environment),
    ]
    .into_iter()
    .find_map(|(rate, source)| {
        rate.filter(|rate| is_valid_sample_rate(*rate))
            .map(|rate| SampleRateResolution { rate, source })
    })
    .unwrap_or(SampleRateResolution {
        rate: 0.0,
        source: SampleRateSource::Default,
    })
}

/// Roll once against `rate` using the operating system's CSPRNG
pub fn compute_sample_outcome(rate: f64) -> bool {
    compute_sample_outcome_with(rate, &mut OsRng)
}

/// Roll once against `rate` using the given generator
///
/// Invalid and non-positive rates never sample.
pub fn compute_sample_outcome_with<R: Rng>(rate: f64, rng: &mut R) -> bool {
    if !is_valid_sample_rate(rate) || rate <= 0.0 {
        return false;
    }
    rng.gen::<f64>() <= rate
}

/// Counters for sampling rolls
#[derive(Debug, Default)]
pub struct SamplerMetrics {
    rolls: AtomicU64,
    sampled: AtomicU64,
}

impl SamplerMetrics {
    pub const fn new() -> Self {
        Self {
            rolls: AtomicU64::new(0),
            sampled: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record(&self, sampled: bool) {
        self.rolls.fetch_add(1, Ordering::Relaxed);
        if sampled {
            self.sampled.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn rolls(&self) -> u64 {
        self.rolls.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sampled(&self) -> u64 {
        self.sampled.load(Ordering::Relaxed)
    }

    /// Share of rolls that forced `DEBUG`; 0.0 before the first roll
    pub fn sampled_ratio(&self) -> f64 {
        let rolls = self.rolls();
        if rolls == 0 {
            0.0
        } else {
            self.sampled() as f64 / rolls as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rate_validity() {
        assert!(is_valid_sample_rate(0.0));
        assert!(is_valid_sample_rate(1.0));
        assert!(is_valid_sample_rate(0.3));
        assert!(!is_valid_sample_rate(-0.1));
        assert!(!is_valid_sample_rate(1.01));
        assert!(!is_valid_sample_rate(f64::NAN));
    }

    #[test]
    fn test_rate_precedence() {
        let r = resolve_sample_rate(Some(0.1), Some(0.2), Some(0.3));
        assert_eq!((r.rate, r.source), (0.1, SampleRateSource::Explicit));

        let r = resolve_sample_rate(None, Some(0.2), Some(0.3));
        assert_eq!((r.rate, r.source), (0.2, SampleRateSource::Config));

        let r = resolve_sample_rate(None, None, Some(0.3));
        assert_eq!((r.rate, r.source), (0.3, SampleRateSource::Environment));

        let r = resolve_sample_rate(None, None, None);
        assert_eq!((r.rate, r.source), (0.0, SampleRateSource::Default));
    }

    #[test]
    fn test_explicit_zero_stops_search() {
        let r = resolve_sample_rate(Some(0.0), Some(1.0), Some(1.0));
        assert_eq!((r.rate, r.source), (0.0, SampleRateSource::Explicit));
    }

    #[test]
    fn test_out_of_range_falls_through() {
        let r = resolve_sample_rate(Some(2.0), Some(-1.0), None);
        assert_eq!((r.rate, r.source), (0.0, SampleRateSource::Default));
    }

    #[test]
    fn test_rate_zero_never_samples() {
        for _ in 0..1000 {
            assert!(!compute_sample_outcome(0.0));
        }
    }

    #[test]
    fn test_rate_one_always_samples() {
        for _ in 0..1000 {
            assert!(compute_sample_outcome(1.0));
        }
    }

    #[test]
    fn test_out_of_range_rate_never_samples() {
        for _ in 0..1000 {
            assert!(!compute_sample_outcome(1.5));
            assert!(!compute_sample_outcome(-0.5));
        }
    }

    #[test]
    fn test_statistical_rate() {
        let mut rng = StdRng::seed_from_u64(7);
        let total = 10_000;
        let sampled = (0..total)
            .filter(|_| compute_sample_outcome_with(0.5, &mut rng))
            .count();

        let rate = sampled as f64 / total as f64;
        assert!(
            (0.45..=0.55).contains(&rate),
            "Expected ~50% sample rate, got {}%",
            rate * 100.0
        );
    }

    #[test]
    fn test_sampler_metrics() {
        let metrics = SamplerMetrics::new();
        assert_eq!(metrics.sampled_ratio(), 0.0);

        metrics.record(true);
        metrics.record(false);
        metrics.record(false);
        metrics.record(true);

        assert_eq!(metrics.rolls(), 4);
        assert_eq!(metrics.sampled(), 2);
        assert_eq!(metrics.sampled_ratio(), 0.5);
    }
}
