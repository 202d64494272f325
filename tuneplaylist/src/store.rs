//! Persistence hooks for the playlist.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};
use tunesource::Song;

use crate::error::Result;

/// Loads and saves the playlist content.
///
/// Only the songs are persisted; the cursor starts on the first song after a
/// load.
#[async_trait]
pub trait PlaylistStore: Debug + Send + Sync {
    async fn load_playlist(&self) -> Result<Vec<Song>>;

    async fn save_playlist(&self, songs: &[Song]) -> Result<()>;
}

/// Volatile store, mostly useful in tests.
#[derive(Debug, Default)]
pub struct MemoryPlaylistStore {
    songs: Mutex<Vec<Song>>,
}

impl MemoryPlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_songs(songs: Vec<Song>) -> Self {
        Self {
            songs: Mutex::new(songs),
        }
    }
}

#[async_trait]
impl PlaylistStore for MemoryPlaylistStore {
    async fn load_playlist(&self) -> Result<Vec<Song>> {
        Ok(self.songs.lock().await.clone())
    }

    async fn save_playlist(&self, songs: &[Song]) -> Result<()> {
        *self.songs.lock().await = songs.to_vec();
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PlaylistDocument {
    songs: Vec<Song>,
}

/// Stores the playlist as a JSON document.
///
/// A missing file loads as an empty playlist. Saving writes a sibling
/// temporary file and renames it over the target.
#[derive(Debug, Clone)]
pub struct JsonPlaylistStore {
    path: PathBuf,
}

impl JsonPlaylistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PlaylistStore for JsonPlaylistStore {
    async fn load_playlist(&self) -> Result<Vec<Song>> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No saved playlist");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let document: PlaylistDocument = serde_json::from_slice(&data)?;
        info!(path = %self.path.display(), songs = document.songs.len(), "Playlist loaded");
        Ok(document.songs)
    }

    async fn save_playlist(&self, songs: &[Song]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let document = PlaylistDocument {
            songs: songs.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&document)?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        info!(path = %self.path.display(), songs = songs.len(), "Playlist saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunesource::SourceKind;

    fn songs() -> Vec<Song> {
        vec![
            Song::local("l1", "One", "A", "B", 10.0, "/m/l1.mp3"),
            Song::remote(SourceKind::Spotify, "s1", "Two", "C", "D", 20.0, "https://s/s1")
                .with_artwork("https://s/s1.jpg"),
        ]
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryPlaylistStore::new();
        assert!(store.load_playlist().await.unwrap().is_empty());
        store.save_playlist(&songs()).await.unwrap();
        assert_eq!(store.load_playlist().await.unwrap(), songs());
    }

    #[tokio::test]
    async fn test_json_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPlaylistStore::new(dir.path().join("none.json"));
        assert!(store.load_playlist().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json_store_persists_songs() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPlaylistStore::new(dir.path().join("nested/playlist.json"));
        store.save_playlist(&songs()).await.unwrap();

        let loaded = JsonPlaylistStore::new(store.path()).load_playlist().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].local_path(), Some("/m/l1.mp3"));
        assert_eq!(loaded[1].source(), SourceKind::Spotify);
        assert_eq!(loaded[1].artwork_url(), Some("https://s/s1.jpg"));
    }

    #[tokio::test]
    async fn test_json_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("playlist.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let err = JsonPlaylistStore::new(path).load_playlist().await.unwrap_err();
        assert!(matches!(err, crate::Error::Json(_)));
    }

    #[tokio::test]
    async fn test_json_store_unreadable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();

        // A directory exists at the path but cannot be read as a file.
        let err = JsonPlaylistStore::new(dir.path()).load_playlist().await.unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)), "got {:?}", err);
    }
}
