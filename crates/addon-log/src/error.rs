//! Errors

/// addon-log error
///
/// Only the settings-store seam produces these. The logging operations
/// themselves never return an error to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Settings store is not reachable
    #[error("Settings store unavailable: {0}")]
    Unavailable(String),
    /// Setting key is malformed
    #[error("Invalid setting key: {0}")]
    InvalidKey(String),
    /// Serde Error
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    /// Backend error
    #[error(transparent)]
    Database(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap any backend error
    pub fn database<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Database(Box::new(err))
    }
}
