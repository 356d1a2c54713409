#![deny(missing_docs)]
//! Shared logging utilities for the MarketBridge workspace.
//!
//! Provides the `bridge_*` logging macros, which stamp every record with the
//! virtual clock of the dispatch thread, and a terminal logger initializer
//! for tests.

use std::cell::Cell;

thread_local! {
    /// Virtual clock of the current thread, in milliseconds since start.
    static CLOCK_MS: Cell<u64> = const { Cell::new(0) };
}

/// Records the virtual clock for the current thread.
/// The event loop calls this once per tick before dispatching.
pub fn set_clock_ms(ms: u64) {
    CLOCK_MS.with(|v| v.set(ms));
}

/// Returns the virtual clock recorded for the current thread, or 0.
pub fn clock_ms() -> u64 {
    CLOCK_MS.with(|v| v.get())
}

/// Logs a trace-level message stamped with the virtual clock.
#[macro_export]
macro_rules! bridge_trace {
    ($($arg:tt)*) => {{
        log::trace!("[t+{}ms] {}", $crate::clock_ms(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message stamped with the virtual clock.
#[macro_export]
macro_rules! bridge_debug {
    ($($arg:tt)*) => {{
        log::debug!("[t+{}ms] {}", $crate::clock_ms(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message stamped with the virtual clock.
#[macro_export]
macro_rules! bridge_info {
    ($($arg:tt)*) => {{
        log::info!("[t+{}ms] {}", $crate::clock_ms(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message stamped with the virtual clock.
#[macro_export]
macro_rules! bridge_warn {
    ($($arg:tt)*) => {{
        log::warn!("[t+{}ms] {}", $crate::clock_ms(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message stamped with the virtual clock.
#[macro_export]
macro_rules! bridge_error {
    ($($arg:tt)*) => {{
        log::error!("[t+{}ms] {}", $crate::clock_ms(), format_args!($($arg)*));
    }};
}

/// Initializes a terminal logger for tests.
///
/// Safe to call repeatedly: a second initialization is ignored.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
