#![deny(missing_docs)]
//! Shared logging utilities for the coupon dispatch workspace.
//!
//! This crate provides the `coupon_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Lines logged while a
//! message is being handled start with its sequence number (`#12 ...`), so
//! everything one message caused can be found in the log.

use std::cell::Cell;
use std::fmt;

thread_local! {
    /// Thread-local sequence number of the message currently being handled.
    static MSG_SEQ: Cell<u64> = const { Cell::new(0) };
}

/// Records the sequence number of the message the current thread is handling.
/// The app event loop calls this once per dispatched message.
pub fn set_msg_seq(seq: u64) {
    MSG_SEQ.with(|v| v.set(seq));
}

/// Returns the sequence number of the message being handled on this thread.
/// Returns 0 before the first message.
pub fn msg_seq() -> u64 {
    MSG_SEQ.with(|v| v.get())
}

/// Writes `#<seq> ` for the message being handled on this thread, or
/// nothing outside message handling. Used by the `coupon_*` macros.
#[doc(hidden)]
pub struct SeqPrefix;

impl fmt::Display for SeqPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match msg_seq() {
            0 => Ok(()),
            seq => write!(f, "#{seq} "),
        }
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! coupon_trace {
    ($($arg:tt)*) => {{
        log::trace!("{}{}", $crate::SeqPrefix, format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! coupon_info {
    ($($arg:tt)*) => {{
        log::info!("{}{}", $crate::SeqPrefix, format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! coupon_debug {
    ($($arg:tt)*) => {{
        log::debug!("{}{}", $crate::SeqPrefix, format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! coupon_warn {
    ($($arg:tt)*) => {{
        log::warn!("{}{}", $crate::SeqPrefix, format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! coupon_error {
    ($($arg:tt)*) => {{
        log::error!("{}{}", $crate::SeqPrefix, format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may already own the global logger.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
