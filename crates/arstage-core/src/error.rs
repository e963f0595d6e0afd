/// Core error types for the arstage runtime.
use std::path::PathBuf;

/// A specialized Result type for arstage operations.
pub type ArResult<T> = Result<T, ArError>;

/// Top-level error type encompassing all arstage subsystems.
#[derive(Debug, thiserror::Error)]
pub enum ArError {
    #[error("media resource unavailable: {source_path} ({reason})")]
    ResourceUnavailable { source_path: String, reason: String },

    #[error("asset error: {message} ({path:?})")]
    Asset { message: String, path: PathBuf },

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("event channel closed")]
    ChannelClosed,

    #[error("{0}")]
    Other(String),
}

impl ArError {
    /// Create a resource-unavailable error for a media source.
    pub fn unavailable(source_path: impl Into<String>, reason: impl Into<String>) -> Self {
        ArError::ResourceUnavailable {
            source_path: source_path.into(),
            reason: reason.into(),
        }
    }

    /// Create an asset error.
    pub fn asset(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ArError::Asset {
            message: message.into(),
            path: path.into(),
        }
    }
}
