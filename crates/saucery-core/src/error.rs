//! Unified error types for saucery

use thiserror::Error;

/// Unified error type for all saucery operations
#[derive(Error, Debug)]
pub enum SauceError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    // Remote job status errors
    #[error("Transport error: {context}")]
    Transport {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Lifecycle log errors
    #[error("Invalid lifecycle event on line {line}: {message}")]
    Replay { line: usize, message: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SauceError {
    /// Transport failure that keeps the underlying error as its source
    pub fn transport(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            context: context.into(),
            source: Some(source.into()),
        }
    }
}

/// Result type alias using SauceError
pub type Result<T> = std::result::Result<T, SauceError>;

/// Render an error followed by each of its sources on a single line
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str("; caused by: ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
