//! Lumen3D Engine - process-wide logging entry point
//!
//! The logger is the only global state of the engine. Renderers, resource
//! managers and scenes are plain values owned by the application and passed
//! to each other explicitly.

use std::sync::{OnceLock, PoisonError, RwLock, RwLockWriteGuard};
use std::time::SystemTime;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

/// Global logger (initialized lazily with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

fn logger_lock() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::new())))
}

/// Write access to the logger slot
///
/// A poisoned lock only means a logger panicked; the slot is still usable,
/// so reads and writes both recover it.
fn logger_write() -> RwLockWriteGuard<'static, Box<dyn Logger>> {
    logger_lock().write().unwrap_or_else(PoisonError::into_inner)
}

/// Engine-wide services
///
/// # Example
///
/// ```no_run
/// use lumen_3d_engine::lumen3d::{Engine, log::{Logger, LogEntry, LogSeverity, DefaultLogger}};
///
/// // Only warnings and errors
/// Engine::set_logger(DefaultLogger::with_min_severity(LogSeverity::Warn));
/// ```
pub struct Engine;

impl Engine {
    /// Replace the current logger
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        *logger_write() = Box::new(logger);
    }

    /// Restore the default colored console logger
    pub fn reset_logger() {
        *logger_write() = Box::new(DefaultLogger::new());
    }

    /// Log without source location
    ///
    /// Used by engine_trace!, engine_debug!, engine_info! and engine_warn!.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(severity, source, message, None, None);
    }

    /// Log with file:line information
    ///
    /// Used by engine_error!.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(severity, source, message, Some(file), Some(line));
    }

    fn dispatch(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: Option<&'static str>,
        line: Option<u32>,
    ) {
        let lock = logger_lock().read().unwrap_or_else(PoisonError::into_inner);
        lock.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file,
            line,
        });
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
