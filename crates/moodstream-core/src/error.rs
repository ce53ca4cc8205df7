//! Error types for MoodStream

/// Result type alias using MoodStream's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for MoodStream operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid label or filter value
    #[error("invalid label: {0}")]
    InvalidLabel(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
