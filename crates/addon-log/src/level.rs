//! Message levels and their output channels

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag used in prefixes when none is configured
pub const DEFAULT_TAG: &str = "AddonLog";

/// Severity of a logged message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageLevel {
    /// Informational, only shown in debug mode
    Info,
    /// Warning
    Warn,
    /// Error
    Error,
}

impl MessageLevel {
    /// All levels, in ascending severity
    pub const ALL: [MessageLevel; 3] = [MessageLevel::Info, MessageLevel::Warn, MessageLevel::Error];

    /// Level name as used inside the prefix brackets
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageLevel::Info => "INFO",
            MessageLevel::Warn => "WARN",
            MessageLevel::Error => "ERROR",
        }
    }

    /// Output channel that handles this level
    pub fn destination(&self) -> Channel {
        match self {
            MessageLevel::Info => Channel::Log,
            MessageLevel::Warn => Channel::Warn,
            MessageLevel::Error => Channel::Error,
        }
    }

    fn index(&self) -> usize {
        match self {
            MessageLevel::Info => 0,
            MessageLevel::Warn => 1,
            MessageLevel::Error => 2,
        }
    }
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write entry point of a [`Console`](crate::console::Console)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Informational channel (`console.log`)
    Log,
    /// Warning channel (`console.warn`)
    Warn,
    /// Error channel (`console.error`)
    Error,
}

/// Fixed mapping from level to channel and prefix
///
/// Prefixes are built once from the tag and never change afterwards.
#[derive(Debug, Clone)]
pub struct LevelRegistry {
    prefixes: [String; 3],
}

impl LevelRegistry {
    /// Build the registry for the given application tag
    pub fn new(tag: &str) -> Self {
        Self {
            prefixes: MessageLevel::ALL.map(|level| format!("{tag} [{level}]")),
        }
    }

    /// Channel and prefix for `level`
    #[inline]
    pub fn resolve(&self, level: MessageLevel) -> (Channel, &str) {
        (level.destination(), self.prefix(level))
    }

    /// Prefix for `level`
    #[inline]
    pub fn prefix(&self, level: MessageLevel) -> &str {
        &self.prefixes[level.index()]
    }
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TAG)
    }
}
