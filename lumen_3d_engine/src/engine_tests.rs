//! Unit tests for the Engine logging API
//!
//! The logger is process-wide, so every test that swaps it is #[serial].

use crate::lumen3d::Engine;
use crate::lumen3d::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Captures "Severity|source|message|has_location" lines
///
/// Only entries tagged "lumen3d::Test" are kept: unrelated tests running
/// in parallel may log through the same global logger.
struct TestLogger {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source != "lumen3d::Test" {
            return;
        }
        self.entries.lock().unwrap().push(format!(
            "{:?}|{}|{}|{}",
            entry.severity,
            entry.source,
            entry.message,
            entry.file.is_some() && entry.line.is_some()
        ));
    }
}

fn install_test_logger() -> Arc<Mutex<Vec<String>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(TestLogger { entries: entries.clone() });
    entries
}

// ============================================================================
// LOGGING API TESTS
// ============================================================================

#[test]
#[serial]
fn test_log_reaches_custom_logger() {
    let entries = install_test_logger();

    Engine::log(LogSeverity::Info, "lumen3d::Test", "hello".to_string());

    assert_eq!(*entries.lock().unwrap(), vec!["Info|lumen3d::Test|hello|false"]);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_log_detailed_carries_location() {
    let entries = install_test_logger();

    Engine::log_detailed(LogSeverity::Error, "lumen3d::Test", "bad".to_string(), "x.rs", 3);

    assert_eq!(*entries.lock().unwrap(), vec!["Error|lumen3d::Test|bad|true"]);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_macros_route_through_engine() {
    let entries = install_test_logger();

    crate::engine_trace!("lumen3d::Test", "t{}", 1);
    crate::engine_debug!("lumen3d::Test", "d{}", 2);
    crate::engine_info!("lumen3d::Test", "i{}", 3);
    crate::engine_warn!("lumen3d::Test", "w{}", 4);
    crate::engine_error!("lumen3d::Test", "e{}", 5);

    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0], "Trace|lumen3d::Test|t1|false");
    assert_eq!(entries[3], "Warn|lumen3d::Test|w4|false");
    assert_eq!(entries[4], "Error|lumen3d::Test|e5|true");
    drop(entries);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_engine_err_logs_error() {
    let entries = install_test_logger();

    let _err = crate::engine_err!("lumen3d::Test", "device lost");

    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].starts_with("Error|lumen3d::Test|device lost"));
    drop(entries);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    let entries = install_test_logger();
    Engine::reset_logger();

    Engine::log(LogSeverity::Info, "lumen3d::Test", "to stdout".to_string());

    assert!(entries.lock().unwrap().is_empty());
}

// ============================================================================
// POISONED LOCK
// ============================================================================

#[test]
#[serial]
fn test_set_logger_recovers_poisoned_lock() {
    let _ = std::thread::spawn(|| {
        let _slot = super::logger_lock().write().unwrap();
        panic!("logger slot poisoned while held for writing");
    })
    .join();
    assert!(super::logger_lock().is_poisoned());

    let entries = install_test_logger();
    Engine::log(LogSeverity::Warn, "lumen3d::Test", "still logging".to_string());

    assert_eq!(*entries.lock().unwrap(), vec!["Warn|lumen3d::Test|still logging|false"]);
    Engine::reset_logger();
    super::logger_lock().clear_poison();
}
