//! Error types for the volume scheduler

use std::sync::Arc;

use thiserror::Error;

use crate::framework::ExtensionPoint;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Shared, type-erased cause carried by a failed [`Status`](crate::framework::Status).
pub type BoxError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while running a scheduling cycle
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// A plugin returned a non-success status at an extension point
    #[error("running {point} plugin \"{plugin}\": {source}")]
    PluginFailed {
        point: ExtensionPoint,
        plugin: String,
        #[source]
        source: BoxError,
    },

    /// A score plugin produced a score outside the allowed range
    #[error(
        "plugin \"{plugin}\" returned an invalid score {score} for pool {pool}, \
         it should be in the range of [{min}, {max}]"
    )]
    InvalidScore {
        plugin: String,
        pool: String,
        score: i64,
        min: i64,
        max: i64,
    },

    /// Normalization changed which pools a score list covers, or their order
    #[error(
        "score plugin \"{plugin}\" changed the pools or order of its score list while normalizing"
    )]
    ScoreListMismatch { plugin: String },

    /// A score weight in the configuration is not usable
    #[error("invalid weight {weight} for score plugin \"{plugin}\": weights must be positive")]
    InvalidWeight { plugin: String, weight: i64 },

    /// The same plugin name was registered twice at one extension point
    #[error("plugin \"{plugin}\" is registered more than once at {point}")]
    DuplicatePlugin {
        point: ExtensionPoint,
        plugin: String,
    },

    /// A permit plugin asked to wait without a usable duration
    #[error("permit plugin \"{plugin}\" requested a wait without a positive duration")]
    InvalidPermitWait { plugin: String },

    /// The scheduling context was cancelled
    #[error("scheduling context cancelled")]
    Cancelled,

    /// The scheduling context deadline passed
    #[error("scheduling context deadline exceeded")]
    DeadlineExceeded,

    /// No data is stored in the cycle state under the key
    #[error("not found: {0}")]
    StateNotFound(String),

    /// Data stored under the key has a different type than requested
    #[error("cycle state entry {0} has an unexpected type")]
    StateTypeMismatch(String),

    /// Message-bearing error produced from a failed status without a cause
    #[error("{0}")]
    Status(String),

    /// Duration parse error
    #[error("Failed to parse duration: {0}")]
    DurationParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML decode error
    #[error("YAML error: {0}")]
    Yaml(#[source] Arc<serde_yaml::Error>),

    /// JSON decode error
    #[error("JSON error: {0}")]
    Json(#[source] Arc<serde_json::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[source] Arc<std::io::Error>),
}

impl Error {
    /// Whether this error came from the scheduling context being done.
    pub fn is_context_error(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Yaml(Arc::new(e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(Arc::new(e))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(Arc::new(e))
    }
}
