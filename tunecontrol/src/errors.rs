use thiserror::Error;
use tunesource::{SourceError, SourceKind};

#[derive(Error, Debug)]
pub enum ControlError {
    #[error("No provider registered for source {0}")]
    UnknownSource(SourceKind),
    #[error("Cannot build source {0}: {1}")]
    SourceBuild(SourceKind, String),
    #[error("No playlist store configured")]
    NoPlaylistStore,
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("Playlist Error: {0}")]
    Playlist(#[from] tuneplaylist::Error),
    #[error("Configuration Error: {0}")]
    Config(#[from] anyhow::Error),
}

impl ControlError {
    pub fn source_build(kind: SourceKind, message: impl ToString) -> Self {
        ControlError::SourceBuild(kind, message.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ControlError>;
