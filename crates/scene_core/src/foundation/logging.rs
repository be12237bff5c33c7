//! Logging utilities and scene diagnostics
//!
//! Library code logs through the `log` facade. Recoverable scene misuse
//! (stale handles, rejected reparenting) is reported through a
//! [`DiagnosticSink`] owned by each `Scene`, so tests can capture warnings for
//! one scene without touching process-wide logger state.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub use log::{debug, error, info, trace, warn, Level, LevelFilter};

/// Log target used by [`LogSink`]
pub const SCENE_LOG_TARGET: &str = "scene";

/// Initialize the logging system
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with a default level, still overridable
/// through `RUST_LOG`
pub fn init_with_level(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Receiver for scene diagnostics
pub trait DiagnosticSink {
    /// Handle one diagnostic message
    fn emit(&self, level: Level, message: &str);
}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, level: Level, message: &str) {
        log::log!(target: SCENE_LOG_TARGET, level, "{message}");
    }
}

/// Records diagnostics in memory. Clones share the same record.
#[derive(Debug, Default, Clone)]
pub struct CaptureSink {
    entries: Rc<RefCell<Vec<(Level, String)>>>,
}

impl CaptureSink {
    /// Create an empty capture
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything captured so far
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.borrow().clone()
    }

    /// Captured messages at `Warn` level
    pub fn warnings(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(level, _)| *level == Level::Warn)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Number of captured messages
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// True when nothing was captured
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Forget captured messages
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl DiagnosticSink for CaptureSink {
    fn emit(&self, level: Level, message: &str) {
        self.entries.borrow_mut().push((level, message.to_owned()));
    }
}

/// Owned diagnostic sink slot
pub struct Diagnostics {
    sink: Box<dyn DiagnosticSink>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics").finish_non_exhaustive()
    }
}

impl Diagnostics {
    /// Slot holding the default [`LogSink`]
    pub fn new() -> Self {
        Self { sink: Box::new(LogSink) }
    }

    /// Replace the sink, returning the previous one
    pub fn install(&mut self, sink: Box<dyn DiagnosticSink>) -> Box<dyn DiagnosticSink> {
        std::mem::replace(&mut self.sink, sink)
    }

    /// Restore the default sink, returning the removed one
    pub fn remove(&mut self) -> Box<dyn DiagnosticSink> {
        self.install(Box::new(LogSink))
    }

    /// Emit a warning
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        match args.as_str() {
            Some(message) => self.sink.emit(Level::Warn, message),
            None => self.sink.emit(Level::Warn, &args.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_sink_records_through_diagnostics() {
        let capture = CaptureSink::new();
        let mut diagnostics = Diagnostics::new();
        diagnostics.install(Box::new(capture.clone()));

        diagnostics.warn(format_args!("stale handle {}", 3));
        diagnostics.warn(format_args!("cycle rejected"));

        assert_eq!(capture.len(), 2);
        assert_eq!(
            capture.warnings(),
            vec!["stale handle 3".to_string(), "cycle rejected".to_string()]
        );
    }

    #[test]
    fn test_removed_sink_stops_receiving() {
        let capture = CaptureSink::new();
        let mut diagnostics = Diagnostics::new();
        diagnostics.install(Box::new(capture.clone()));
        diagnostics.remove();

        diagnostics.warn(format_args!("after removal"));
        assert!(capture.is_empty());
    }
}
