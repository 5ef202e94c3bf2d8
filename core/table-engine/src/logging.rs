//! FILENAME: core/table-engine/src/logging.rs
// PURPOSE: Category-tagged logging for the table pipeline.
// CONTEXT: Lines are written as `CATEGORY|message` through the `log` facade,
//          so the host application decides where they end up.

pub use log::Level;

/// Target used for every line written by this crate.
pub const LOG_TARGET: &str = "table_engine";

/// Returns true if a line at `level` would be written.
pub fn enabled(level: Level) -> bool {
    log::log_enabled!(target: LOG_TARGET, level)
}

/// Write a log line in `CATEGORY|message` format
pub fn write_log(level: Level, category: &str, message: &str) {
    log::log!(target: LOG_TARGET, level, "{}|{}", category, message);
}

/// Write an ENTER log line for function entry
pub fn write_log_enter(level: Level, category: &str, func_name: &str, params: &str) {
    let message = if params.is_empty() {
        format!("ENTER {}", func_name)
    } else {
        format!("ENTER {} {}", func_name, params)
    };
    write_log(level, category, &message);
}

/// Write an EXIT log line for function exit
pub fn write_log_exit(level: Level, category: &str, func_name: &str, result: &str) {
    let message = if result.is_empty() {
        format!("EXIT {}", func_name)
    } else {
        format!("EXIT {} {}", func_name, result)
    };
    write_log(level, category, &message);
}

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        if $crate::logging::enabled($crate::logging::Level::Debug) {
            $crate::logging::write_log($crate::logging::Level::Debug, $cat, &format!($($arg)*))
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        if $crate::logging::enabled($crate::logging::Level::Info) {
            $crate::logging::write_log($crate::logging::Level::Info, $cat, &format!($($arg)*))
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        if $crate::logging::enabled($crate::logging::Level::Warn) {
            $crate::logging::write_log($crate::logging::Level::Warn, $cat, &format!($($arg)*))
        }
    };
}

// ENTER/EXIT macros for function tracing

#[macro_export]
macro_rules! log_enter {
    ($cat:expr, $func:expr) => {
        if $crate::logging::enabled($crate::logging::Level::Debug) {
            $crate::logging::write_log_enter($crate::logging::Level::Debug, $cat, $func, "")
        }
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        if $crate::logging::enabled($crate::logging::Level::Debug) {
            $crate::logging::write_log_enter($crate::logging::Level::Debug, $cat, $func, &format!($($arg)*))
        }
    };
}

#[macro_export]
macro_rules! log_exit {
    ($cat:expr, $func:expr) => {
        if $crate::logging::enabled($crate::logging::Level::Debug) {
            $crate::logging::write_log_exit($crate::logging::Level::Debug, $cat, $func, "")
        }
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        if $crate::logging::enabled($crate::logging::Level::Debug) {
            $crate::logging::write_log_exit($crate::logging::Level::Debug, $cat, $func, &format!($($arg)*))
        }
    };
}

// Re-export the macros so they can be imported via `use crate::logging::log_info;`
pub use log_debug;
pub use log_enter;
pub use log_exit;
pub use log_info;
pub use log_warn;
