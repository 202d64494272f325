//! Error types for catalog clients

use thiserror::Error;
use tunesource::SourceError;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to a catalog
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-success HTTP status
    #[error("Catalog returned error status: {0}")]
    Status(u16),

    /// The response did not contain the requested track
    #[error("Track not found in catalog response: {0}")]
    TrackNotFound(String),
}

impl Error {
    /// Whether the failure happened while decoding the payload
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Json(_) | Error::TrackNotFound(_))
    }
}

impl From<Error> for SourceError {
    fn from(err: Error) -> Self {
        if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_onto_source_taxonomy() {
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(
            SourceError::from(Error::from(decode)),
            SourceError::Decode(_)
        ));
        assert!(matches!(
            SourceError::from(Error::TrackNotFound("42".into())),
            SourceError::Decode(_)
        ));
        assert!(matches!(
            SourceError::from(Error::Status(503)),
            SourceError::Network(_)
        ));
        assert!(matches!(
            SourceError::from(Error::from(url::Url::parse("not a url").unwrap_err())),
            SourceError::Network(_)
        ));
    }
}
