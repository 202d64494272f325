use crate::song::SourceKind;

/// Error types for music source operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    /// Transport-level failure talking to a remote catalog.
    #[error("Network error: {0}")]
    Network(String),

    /// A catalog answered with a payload that could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The provider was shut down.
    #[error("Source {0} has been disposed")]
    Disposed(SourceKind),

    #[error("Song not found: {0}")]
    NotFound(String),

    #[error("Unknown source kind: {0}")]
    InvalidKind(String),
}

impl SourceError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Result type for music source operations
pub type Result<T> = std::result::Result<T, SourceError>;
