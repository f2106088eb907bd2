//! Logging facade
//!
//! [`Logger`] owns the debug-mode state, gates informational output on it,
//! freezes arguments and dispatches them to its [`Console`].

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::console::{default_console, Console};
use crate::level::{LevelRegistry, MessageLevel, DEFAULT_TAG};
use crate::settings::SettingsStore;
use crate::value::{Frozen, Value};

/// Text logged at ERROR when a log call carries no arguments
pub const NO_PARAMETERS_MESSAGE: &str = "log has been called without parameters";

/// Settings key holding the debug flag, unless configured otherwise
pub const DEFAULT_SETTINGS_KEY: &str = "debugMode";

/// Debug mode of a [`Logger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DebugMode {
    /// Not loaded yet; informational output is shown
    #[default]
    Unset,
    /// Informational output is shown
    Enabled,
    /// Informational output is suppressed
    Disabled,
}

impl DebugMode {
    const UNSET: u8 = 0;
    const ENABLED: u8 = 1;
    const DISABLED: u8 = 2;

    fn to_u8(self) -> u8 {
        match self {
            DebugMode::Unset => Self::UNSET,
            DebugMode::Enabled => Self::ENABLED,
            DebugMode::Disabled => Self::DISABLED,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            Self::ENABLED => DebugMode::Enabled,
            Self::DISABLED => DebugMode::Disabled,
            _ => DebugMode::Unset,
        }
    }

    /// Whether messages of `level` may reach the console in this mode
    pub fn allows(&self, level: MessageLevel) -> bool {
        !(level == MessageLevel::Info && *self == DebugMode::Disabled)
    }
}

impl From<Option<bool>> for DebugMode {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => DebugMode::Enabled,
            Some(false) => DebugMode::Disabled,
            None => DebugMode::Unset,
        }
    }
}

impl From<DebugMode> for Option<bool> {
    fn from(mode: DebugMode) -> Self {
        match mode {
            DebugMode::Enabled => Some(true),
            DebugMode::Disabled => Some(false),
            DebugMode::Unset => None,
        }
    }
}

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Application tag put in front of every prefix
    pub tag: String,
    /// Settings key holding the debug flag
    pub settings_key: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            tag: DEFAULT_TAG.to_string(),
            settings_key: DEFAULT_SETTINGS_KEY.to_string(),
        }
    }
}

/// Leveled logger with debug-mode gating
pub struct Logger {
    registry: LevelRegistry,
    settings_key: String,
    debug_mode: AtomicU8,
    console: Arc<dyn Console>,
    settings: Option<Arc<dyn SettingsStore>>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("registry", &self.registry)
            .field("settings_key", &self.settings_key)
            .field("debug_mode", &self.debug_mode())
            .field("console", &self.console)
            .field("settings", &self.settings)
            .finish()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LoggerConfig::default(), default_console())
    }
}

impl Logger {
    /// Create a logger writing to `console`, starting with debug mode unset
    pub fn new(config: LoggerConfig, console: Arc<dyn Console>) -> Self {
        Self {
            registry: LevelRegistry::new(&config.tag),
            settings_key: config.settings_key,
            debug_mode: AtomicU8::new(DebugMode::Unset.to_u8()),
            console,
            settings: None,
        }
    }

    /// Attach the settings store [`Logger::initialize`] reads from
    pub fn with_settings(mut self, settings: Arc<dyn SettingsStore>) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Level registry in use
    pub fn registry(&self) -> &LevelRegistry {
        &self.registry
    }

    /// Current debug mode
    pub fn debug_mode(&self) -> DebugMode {
        DebugMode::from_u8(self.debug_mode.load(Ordering::Acquire))
    }

    /// Override the debug mode
    ///
    /// `None` resets to [`DebugMode::Unset`]. A reset does not reload the
    /// setting; informational output stays visible until the next
    /// [`Logger::initialize`] or override.
    pub fn set_debug_mode(&self, value: Option<bool>) {
        self.store_debug_mode(DebugMode::from(value));
    }

    fn store_debug_mode(&self, mode: DebugMode) {
        self.debug_mode.store(mode.to_u8(), Ordering::Release);
    }

    /// Load the debug flag from the settings store
    ///
    /// Never fails. Without a store, or when the store errors, has no value
    /// or holds something other than a boolean, the current mode is kept.
    pub async fn initialize(&self) {
        let Some(settings) = &self.settings else {
            tracing::debug!("No settings store attached, keeping debug mode");
            return;
        };

        match settings.get(&self.settings_key).await {
            Ok(Some(serde_json::Value::Bool(enabled))) => {
                self.set_debug_mode(Some(enabled));
            }
            Ok(Some(other)) => {
                tracing::debug!(
                    "Setting {} is not a boolean: {}, keeping debug mode",
                    self.settings_key,
                    other
                );
            }
            Ok(None) => {
                tracing::debug!(
                    "Setting {} not stored, keeping debug mode",
                    self.settings_key
                );
            }
            Err(err) => {
                tracing::debug!("Could not load debug mode: {}", err);
            }
        }
    }

    /// Log `args` at `level`
    ///
    /// Without arguments a fixed diagnostic is logged at ERROR instead.
    /// Informational messages are dropped while debug mode is disabled.
    pub fn log(&self, level: MessageLevel, args: Vec<Value>) {
        if args.is_empty() {
            self.dispatch(
                MessageLevel::Error,
                vec![Frozen::Value(Value::from(NO_PARAMETERS_MESSAGE))],
            );
            return;
        }

        if !self.debug_mode().allows(level) {
            return;
        }

        let frozen = args.into_iter().map(Value::freeze).collect();
        self.dispatch(level, frozen);
    }

    /// Log `args` at INFO
    #[inline]
    pub fn log_info(&self, args: Vec<Value>) {
        self.log(MessageLevel::Info, args);
    }

    /// Log `args` at WARN
    #[inline]
    pub fn log_warning(&self, args: Vec<Value>) {
        self.log(MessageLevel::Warn, args);
    }

    /// Log `args` at ERROR
    #[inline]
    pub fn log_error(&self, args: Vec<Value>) {
        self.log(MessageLevel::Error, args);
    }

    fn dispatch(&self, level: MessageLevel, args: Vec<Frozen>) {
        let (channel, prefix) = self.registry.resolve(level);
        self.console.write(channel, prefix, &args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::MemoryConsole;
    use crate::level::Channel;

    fn memory_logger() -> (Logger, MemoryConsole) {
        let console = MemoryConsole::new();
        let logger = Logger::new(LoggerConfig::default(), Arc::new(console.clone()));
        (logger, console)
    }

    #[test]
    fn test_debug_mode_gating_table() {
        use MessageLevel::*;

        assert!(DebugMode::Unset.allows(Info));
        assert!(DebugMode::Enabled.allows(Info));
        assert!(!DebugMode::Disabled.allows(Info));

        for mode in [DebugMode::Unset, DebugMode::Enabled, DebugMode::Disabled] {
            assert!(mode.allows(Warn));
            assert!(mode.allows(Error));
        }
    }

    #[test]
    fn test_debug_mode_option_conversion() {
        for value in [Some(true), Some(false), None] {
            assert_eq!(Option::<bool>::from(DebugMode::from(value)), value);
        }
    }

    #[test]
    fn test_starts_unset() {
        let (logger, _) = memory_logger();
        assert_eq!(logger.debug_mode(), DebugMode::Unset);
    }

    #[test]
    fn test_set_debug_mode_transitions() {
        let (logger, _) = memory_logger();

        logger.set_debug_mode(Some(true));
        assert_eq!(logger.debug_mode(), DebugMode::Enabled);

        logger.set_debug_mode(Some(false));
        assert_eq!(logger.debug_mode(), DebugMode::Disabled);

        logger.set_debug_mode(None);
        assert_eq!(logger.debug_mode(), DebugMode::Unset);
    }

    #[test]
    fn test_empty_args_log_error_diagnostic() {
        let (logger, console) = memory_logger();
        logger.set_debug_mode(Some(false));

        logger.log_info(vec![]);

        let records = console.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].channel, Channel::Error);
        assert_eq!(records[0].prefix, "AddonLog [ERROR]");
        assert_eq!(records[0].args, vec![Frozen::from(NO_PARAMETERS_MESSAGE)]);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: LoggerConfig = serde_json::from_str(r#"{"tag": "QR"}"#).unwrap();

        assert_eq!(config.tag, "QR");
        assert_eq!(config.settings_key, DEFAULT_SETTINGS_KEY);
    }

    #[tokio::test]
    async fn test_initialize_without_store_keeps_mode() {
        let (logger, _) = memory_logger();
        logger.set_debug_mode(Some(false));

        logger.initialize().await;

        assert_eq!(logger.debug_mode(), DebugMode::Disabled);
    }
}
