//! Output destinations
//!
//! A [`Console`] exposes the three independent write entry points a browser
//! console has. The [`Logger`](crate::Logger) never fails on a write, so
//! implementations must swallow their own errors.

use std::fmt::{self, Write as _};

use crate::level::Channel;
use crate::value::Frozen;

mod memory;
#[cfg(target_arch = "wasm32")]
mod web;

pub use memory::{MemoryConsole, Record};
#[cfg(target_arch = "wasm32")]
pub use web::WebConsole;

/// Console-like output destination
pub trait Console: fmt::Debug + Send + Sync {
    /// Write to the informational channel
    fn log(&self, prefix: &str, args: &[Frozen]);

    /// Write to the warning channel
    fn warn(&self, prefix: &str, args: &[Frozen]);

    /// Write to the error channel
    fn error(&self, prefix: &str, args: &[Frozen]);

    /// Write to `channel`
    fn write(&self, channel: Channel, prefix: &str, args: &[Frozen]) {
        match channel {
            Channel::Log => self.log(prefix, args),
            Channel::Warn => self.warn(prefix, args),
            Channel::Error => self.error(prefix, args),
        }
    }
}

/// Render `prefix` and `args` separated by spaces, the way a console prints them
pub fn render(prefix: &str, args: &[Frozen]) -> String {
    let mut line = String::from(prefix);
    for arg in args {
        // Writing into a String cannot fail
        let _ = write!(line, " {arg}");
    }
    line
}

/// Console that forwards to `tracing` events
///
/// The informational channel maps to `info`, the others to `warn` and
/// `error`. Needs a subscriber to be installed to show anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingConsole;

impl Console for TracingConsole {
    fn log(&self, prefix: &str, args: &[Frozen]) {
        tracing::info!("{}", render(prefix, args));
    }

    fn warn(&self, prefix: &str, args: &[Frozen]) {
        tracing::warn!("{}", render(prefix, args));
    }

    fn error(&self, prefix: &str, args: &[Frozen]) {
        tracing::error!("{}", render(prefix, args));
    }
}

/// Console that prints to stdout and stderr
///
/// Useful in hosts where no tracing subscriber is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn log(&self, prefix: &str, args: &[Frozen]) {
        println!("{}", render(prefix, args));
    }

    fn warn(&self, prefix: &str, args: &[Frozen]) {
        eprintln!("{}", render(prefix, args));
    }

    fn error(&self, prefix: &str, args: &[Frozen]) {
        eprintln!("{}", render(prefix, args));
    }
}

/// Destination used when none is given explicitly
///
/// Browser console on wasm32, stdout/stderr with the `ffi` feature, tracing
/// otherwise.
#[cfg(target_arch = "wasm32")]
pub fn default_console() -> std::sync::Arc<dyn Console> {
    std::sync::Arc::new(WebConsole)
}

/// Destination used when none is given explicitly
///
/// Browser console on wasm32, stdout/stderr with the `ffi` feature, tracing
/// otherwise.
#[cfg(all(not(target_arch = "wasm32"), feature = "ffi"))]
pub fn default_console() -> std::sync::Arc<dyn Console> {
    std::sync::Arc::new(StdConsole)
}

/// Destination used when none is given explicitly
///
/// Browser console on wasm32, stdout/stderr with the `ffi` feature, tracing
/// otherwise.
#[cfg(all(not(target_arch = "wasm32"), not(feature = "ffi")))]
pub fn default_console() -> std::sync::Arc<dyn Console> {
    std::sync::Arc::new(TracingConsole)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{SharedObject, Value};

    #[test]
    fn test_render_joins_with_spaces() {
        let args = vec![
            Value::from("a great string").freeze(),
            Value::from(SharedObject::from_iter([("integers", 123)])).freeze(),
        ];

        assert_eq!(
            render("AddonLog [INFO]", &args),
            r#"AddonLog [INFO] a great string {"integers":123}"#
        );
    }

    #[test]
    fn test_render_prefix_only() {
        assert_eq!(render("AddonLog [ERROR]", &[]), "AddonLog [ERROR]");
    }

    #[test]
    fn test_write_dispatches_by_channel() {
        let console = MemoryConsole::new();

        console.write(Channel::Warn, "p", &[Frozen::from("a")]);
        console.write(Channel::Error, "p", &[Frozen::from("b")]);

        let records = console.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].channel, Channel::Warn);
        assert_eq!(records[1].channel, Channel::Error);
    }

    #[test]
    fn test_tracing_console_does_not_panic() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        TracingConsole.log("AddonLog [INFO]", &[Frozen::from("info")]);
        TracingConsole.warn("AddonLog [WARN]", &[Frozen::from("warn")]);
        TracingConsole.error("AddonLog [ERROR]", &[Frozen::from("error")]);
    }
}
