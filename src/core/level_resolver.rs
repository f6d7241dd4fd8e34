//! Active level resolution
//!
//! Several sources can name a level. Highest precedence first:
//!
//! 1. the platform-enforced minimum level
//! 2. the level passed explicitly to the builder or setter
//! 3. the custom configuration service
//! 4. the `LOG_LEVEL` environment variable
//! 5. `INFO`
//!
//! Names outside the level table are skipped, never fatal.

use super::log_level::LogLevel;

/// Where the resolved level came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelSource {
    Platform,
    Explicit,
    Config,
    Environment,
    Default,
}

/// Outcome of level resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelResolution {
    pub level: LogLevel,
    pub source: LevelSource,
    /// Set when the platform level overrode a different explicit request
    pub warning: Option<String>,
}

/// Resolve the active level from every candidate source
///
/// # Example
///
/// ```
/// use rust_lambda_logger::core::{resolve_log_level, LevelSource, LogLevel};
///
/// let resolution = resolve_log_level(Some("DEBUG"), Some("WARN"), None, None);
/// assert_eq!(resolution.level, LogLevel::Warn);
/// assert_eq!(resolution.source, LevelSource::Platform);
/// assert!(resolution.warning.is_some());
/// ```
pub fn resolve_log_level(
    explicit: Option<&str>,
    platform: Option<&str>,
    config: Option<&str>,
    env: Option<&str>,
) -> LevelResolution {
    let requested = explicit.and_then(LogLevel::parse_lenient);

    if let Some(platform_level) = platform.and_then(LogLevel::parse_lenient) {
        let warning = requested
            .filter(|level| *level != platform_level)
            .map(|level| platform_mismatch_warning(level, platform_level));
        return LevelResolution {
            level: platform_level,
            source: LevelSource::Platform,
            warning,
        };
    }

    let candidates = [
        (requested, LevelSource::Explicit),
        (config.and_then(LogLevel::parse_lenient), LevelSource::Config),
        (env.and_then(LogLevel::parse_lenient), LevelSource::Environment),
    ];

    candidates
        .into_iter()
        .find_map(|(level, source)| {
            level.map(|level| LevelResolution {
                level,
                source,
                warning: None,
            })
        })
        .unwrap_or(LevelResolution {
            level: LogLevel::default(),
            source: LevelSource::Default,
            warning: None,
        })
}

/// Warning text for a requested level the platform overrides
pub fn platform_mismatch_warning(requested: LogLevel, platform: LogLevel) -> String {
    format!(
        "Current log level ({}) does not match AWS Lambda Advanced Logging Controls minimum log level ({}). \
         This can lead to data loss, consider adjusting them.",
        requested, platform
    )
}
