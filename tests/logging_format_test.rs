//! Integration tests for logging initialization.
//!
//! Only the first `init` in a process installs a subscriber; later calls
//! must be harmless no-ops.

use pfmp::core::logging::{self, LogFormat, LogLevel};
use pfmp::test_utils::TestDir;

#[test]
fn repeated_init_is_harmless() {
    logging::init(LogLevel::Debug, LogFormat::Human, None);
    logging::init(LogLevel::Debug, LogFormat::Json, None);
    logging::init(LogLevel::Info, LogFormat::Compact, None);
    tracing::info!("logging initialized");
}

#[test]
fn unwritable_log_file_falls_back_to_stderr() {
    let dir = TestDir::new();
    let path = dir.file_path("missing/dir/pfmp.log");
    logging::init(LogLevel::Warn, LogFormat::Json, Some(path.clone()));
    assert!(!path.exists());
}

#[test]
fn formats_and_levels_parse_from_arguments() {
    assert_eq!(LogFormat::from_arg("JSON"), Some(LogFormat::Json));
    assert_eq!(LogFormat::from_arg(" compact "), Some(LogFormat::Compact));
    assert_eq!(LogFormat::from_arg("xml"), None);
    assert_eq!(LogLevel::from_arg("verbose"), Some(LogLevel::Debug));
    assert_eq!(LogLevel::from_arg("critical"), Some(LogLevel::Error));
    assert_eq!(LogLevel::Warn.as_filter(), "warn");
}

#[test]
fn explicit_level_wins_over_verbose() {
    assert_eq!(logging::effective_level(Some("info"), true), LogLevel::Info);
}
