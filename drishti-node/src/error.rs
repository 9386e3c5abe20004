//! Error types for the drishti node

/// Result type alias
pub type Result<T> = std::result::Result<T, NodeError>;

/// Node-level error types
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file or value problem
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the fusion pipeline
    #[error(transparent)]
    Fusion(#[from] drishti_fusion::DrishtiError),
}

impl From<toml::de::Error> for NodeError {
    fn from(e: toml::de::Error) -> Self {
        NodeError::Config(e.to_string())
    }
}
