//! Error types shared across Gazeflow crates.

/// Top-level error type for Gazeflow operations.
#[derive(Debug, thiserror::Error)]
pub enum GazeflowError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Signal error: {message}")]
    Signal { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using GazeflowError.
pub type GazeflowResult<T> = Result<T, GazeflowError>;

impl GazeflowError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn signal(msg: impl Into<String>) -> Self {
        Self::Signal {
            message: msg.into(),
        }
    }
}
