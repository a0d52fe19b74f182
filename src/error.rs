//! Error types shared across the frontier.
//!
//! Every failure handled here is local to a single candidate: a malformed URI,
//! a refused submission or a bad configuration value never poisons the
//! frontier or other in-flight candidates.

use thiserror::Error;

/// The error type for all fallible frontier operations.
#[derive(Debug, Error)]
pub enum FrontierError {
    /// A discovered or seeded string could not be turned into a URL.
    #[error("malformed URI '{uri}': {source}")]
    MalformedUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    /// The execution engine's task queue had no room for the task.
    #[error("task queue is full, could not submit {uri}")]
    QueueFull { uri: String },

    /// The execution engine no longer accepts tasks.
    #[error("crawl engine is shutting down, could not submit {uri}")]
    EngineShutdown { uri: String },

    /// Invalid session setup.
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FrontierError {
    /// Returns `true` when the error came from the engine refusing a task.
    pub fn is_submit_failure(&self) -> bool {
        matches!(
            self,
            FrontierError::QueueFull { .. } | FrontierError::EngineShutdown { .. }
        )
    }
}
