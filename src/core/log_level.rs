//! Log level definitions
//!
//! Each level carries a numeric rank. Lower ranks are more verbose, and
//! `Silent` is the maximum, which suppresses every record.

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug = 8,
    #[default]
    Info = 12,
    Warn = 16,
    Error = 20,
    Critical = 24,
    Silent = 28,
}

impl LogLevel {
    /// Every level, ordered from most to least verbose
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Critical,
        LogLevel::Silent,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
            LogLevel::Silent => "SILENT",
        }
    }

    /// Numeric rank of this level
    #[inline]
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Look a level up by its rank
    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.rank() == rank)
    }

    /// Parse a level name, returning `None` for anything outside the table
    ///
    /// Used for untrusted configuration input, which must fall through
    /// rather than fail.
    pub fn parse_lenient(name: &str) -> Option<Self> {
        name.trim().parse().ok()
    }

    /// Whether records should go to the error stream
    pub fn is_error(&self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Critical)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            "SILENT" => Ok(LogLevel::Silent),
            _ => Err(LoggerError::invalid_level(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_strictly_increasing() {
        for pair in LogLevel::ALL.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(LogLevel::Silent, *LogLevel::ALL.iter().max().unwrap());
    }

    #[test]
    fn test_rank_lookup_is_total() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::from_rank(level.rank()), Some(level));
        }
        assert_eq!(LogLevel::from_rank(13), None);
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("Critical".parse::<LogLevel>().unwrap(), LogLevel::Critical);
        assert_eq!(LogLevel::parse_lenient(" warn "), Some(LogLevel::Warn));
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        let err = "TRACE".parse::<LogLevel>().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidLevel { .. }));
        assert_eq!(LogLevel::parse_lenient("WARNING"), None);
        assert_eq!(LogLevel::parse_lenient(""), None);
    }

    #[test]
    fn test_serde_uses_level_names() {
        let json = serde_json::to_string(&LogLevel::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
        let level: LogLevel = serde_json::from_str("\"SILENT\"").unwrap();
        assert_eq!(level, LogLevel::Silent);
    }
}
