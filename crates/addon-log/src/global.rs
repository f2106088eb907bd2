//! Process-wide logger
//!
//! Components that do not carry a [`Logger`] around log through the global
//! instance, usually via the [`log_info!`](crate::log_info),
//! [`log_warn!`](crate::log_warn), [`log_error!`](crate::log_error) and
//! [`log_at!`](crate::log_at) macros. Unless [`install`] is called first, the
//! global logger uses the default configuration and console and has no
//! settings store.

use once_cell::sync::OnceCell;

use crate::logger::Logger;

static GLOBAL: OnceCell<Logger> = OnceCell::new();

/// Install `logger` as the process-wide logger
///
/// Only the first installation wins. If a logger is already in place,
/// including the default one created by an earlier log call, `logger` is
/// handed back.
pub fn install(logger: Logger) -> Result<(), Logger> {
    GLOBAL.set(logger)
}

/// The process-wide logger
pub fn global() -> &'static Logger {
    GLOBAL.get_or_init(Logger::default)
}

/// Load the debug flag for the process-wide logger
pub async fn initialize() {
    global().initialize().await;
}

/// Override the debug mode of the process-wide logger
pub fn set_debug_mode(value: Option<bool>) {
    global().set_debug_mode(value);
}

/// Log at the given level through the process-wide logger.
///
/// Each argument is converted with `Value::from`, so anything with a
/// `From` conversion into [`Value`](crate::Value) can be passed directly.
///
/// ```rust
/// use addon_log::{log_at, MessageLevel};
///
/// log_at!(MessageLevel::Warn, "retrying request", 3);
/// ```
#[macro_export]
macro_rules! log_at {
    ($level:expr $(, $arg:expr)* $(,)?) => {
        $crate::global::global().log($level, ::std::vec![$($crate::Value::from($arg)),*])
    };
}

/// Log an info-level message.
///
/// Suppressed while debug mode is disabled.
#[macro_export]
macro_rules! log_info {
    ($($arg:expr),* $(,)?) => {
        $crate::global::global().log_info(::std::vec![$($crate::Value::from($arg)),*])
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! log_warn {
    ($($arg:expr),* $(,)?) => {
        $crate::global::global().log_warning(::std::vec![$($crate::Value::from($arg)),*])
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! log_error {
    ($($arg:expr),* $(,)?) => {
        $crate::global::global().log_error(::std::vec![$($crate::Value::from($arg)),*])
    };
}

/// Build the argument list for a [`Logger`] call.
///
/// ```rust
/// use addon_log::{args, Logger};
///
/// let logger = Logger::default();
/// logger.log_warning(args!["cache miss", 42]);
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        ::std::vec![$($crate::Value::from($arg)),*]
    };
}
