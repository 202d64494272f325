//! Types d'erreurs pour tuneplaylist

/// Erreurs de persistance de playlist
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid playlist document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type Result spécialisé pour tuneplaylist
pub type Result<T> = std::result::Result<T, Error>;
