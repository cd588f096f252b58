#![deny(missing_docs)]
//! Shared logging utilities for the newswatch workspace.
//!
//! This crate provides the `watch_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every message logged
//! while a poll cycle is in flight is prefixed with that cycle's number.

use std::sync::atomic::{AtomicU64, Ordering};

/// Number of the poll cycle currently in flight, 0 outside of any cycle.
static CURRENT_CYCLE: AtomicU64 = AtomicU64::new(0);

/// Records the poll cycle that subsequent log lines belong to.
/// The scheduler calls this when a cycle starts and resets it to 0 afterwards.
pub fn set_cycle(cycle: u64) {
    CURRENT_CYCLE.store(cycle, Ordering::Relaxed);
}

/// Returns the poll cycle currently in flight, or 0 between cycles.
pub fn current_cycle() -> u64 {
    CURRENT_CYCLE.load(Ordering::Relaxed)
}

/// Returns the `[cycle N] ` prefix for the cycle in flight, or an empty string.
#[doc(hidden)]
pub fn cycle_prefix() -> String {
    match current_cycle() {
        0 => String::new(),
        n => format!("[cycle {n}] "),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! watch_trace {
    ($($arg:tt)*) => {{
        log::trace!("{}{}", $crate::cycle_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! watch_debug {
    ($($arg:tt)*) => {{
        log::debug!("{}{}", $crate::cycle_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! watch_info {
    ($($arg:tt)*) => {{
        log::info!("{}{}", $crate::cycle_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! watch_warn {
    ($($arg:tt)*) => {{
        log::warn!("{}{}", $crate::cycle_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! watch_error {
    ($($arg:tt)*) => {{
        log::error!("{}{}", $crate::cycle_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
