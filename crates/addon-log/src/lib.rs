//! Leveled logging facade for browser extensions.
//!
//! Messages go through three levels ([`MessageLevel`]), each bound to one
//! console channel and one prefix. Informational output is gated behind a
//! debug flag loaded from the extension's settings, and composite arguments
//! are snapshotted at call time so later mutation does not change what was
//! logged.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use addon_log::{args, Logger, LoggerConfig, MemoryConsole, SharedObject};
//!
//! let console = MemoryConsole::new();
//! let logger = Logger::new(LoggerConfig::default(), Arc::new(console.clone()));
//!
//! let request = SharedObject::from_iter([("id", 1)]);
//! logger.log_info(args!["sending", &request]);
//! request.set("id", 2);
//!
//! logger.set_debug_mode(Some(false));
//! logger.log_info(args!["hidden"]);
//! logger.log_warning(args!["shown"]);
//!
//! assert_eq!(console.records().len(), 2);
//! ```
//!
//! ## Feature Flags
//!
//! - `ffi`: the default console prints with `println!`/`eprintln!` instead of
//!   emitting `tracing` events. On wasm32 the browser console is always used.

pub mod console;
mod error;
pub mod global;
pub mod level;
pub mod logger;
pub mod settings;
pub mod value;

pub use console::{Console, MemoryConsole, Record, StdConsole, TracingConsole};
pub use error::Error;
pub use global::{global, install};
pub use level::{Channel, LevelRegistry, MessageLevel};
pub use logger::{DebugMode, Logger, LoggerConfig, NO_PARAMETERS_MESSAGE};
pub use settings::{MemorySettings, SettingsStore};
pub use value::{Frozen, SharedList, SharedObject, Value};
