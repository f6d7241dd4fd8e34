//! In-memory appender
//!
//! Keeps every line it receives. Clones share the same buffer, so a test can
//! hand one clone to the logger and read the output through another.

use crate::core::{Appender, LogLevel, Result};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct MemoryAppender {
    lines: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

impl MemoryAppender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().iter().map(|(_, line)| line.clone()).collect()
    }

    /// Captured lines with the level each was written at
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().clone()
    }

    /// Captured lines parsed as JSON; unparsable lines are skipped
    pub fn records(&self) -> Vec<serde_json::Value> {
        self.lines
            .lock()
            .iter()
            .filter_map(|(_, line)| serde_json::from_str(line).ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl Appender for MemoryAppender {
    fn append(&mut self, level: LogLevel, line: &str) -> Result<()> {
        self.lines.lock().push((level, line.to_string()));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
