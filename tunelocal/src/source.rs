//! [`MusicProvider`] over a fixed in-memory catalog.

use tracing::debug;
use tunesource::{
    EngineSettings, MusicProvider, PlaybackEngine, Result, Song, SourceError, SourceKind,
    async_trait,
};

use crate::library;

/// A source whose catalog lives in memory.
///
/// Used for the local library and for the streaming mock. Search is a
/// case-insensitive substring match on title, artist and album; an empty
/// query returns the whole catalog in catalog order.
#[derive(Debug)]
pub struct LibrarySource {
    name: String,
    engine: PlaybackEngine,
    songs: Vec<Song>,
}

impl LibrarySource {
    /// Builds a source over `songs`.
    ///
    /// Songs whose kind differs from `kind` are dropped.
    pub fn with_songs(
        kind: SourceKind,
        name: impl Into<String>,
        songs: Vec<Song>,
        settings: EngineSettings,
    ) -> Self {
        let songs: Vec<Song> = songs.into_iter().filter(|s| s.source() == kind).collect();
        let name = name.into();
        debug!(source = %kind, name = %name, songs = songs.len(), "Library source created");

        Self {
            name,
            engine: PlaybackEngine::new(kind, settings),
            songs,
        }
    }

    /// The built-in local library.
    pub fn local_library(settings: EngineSettings) -> Self {
        Self::with_songs(
            SourceKind::Local,
            SourceKind::Local.display_name(),
            library::local_library(),
            settings,
        )
    }

    /// The streaming mock catalog.
    pub fn spotify(settings: EngineSettings) -> Self {
        Self::with_songs(
            SourceKind::Spotify,
            SourceKind::Spotify.display_name(),
            library::spotify_catalog(),
            settings,
        )
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }
}

#[async_trait]
impl MusicProvider for LibrarySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    async fn search(&self, query: &str) -> Result<Vec<Song>> {
        self.engine.ensure_alive()?;

        let needle = query.trim().to_lowercase();
        let results: Vec<Song> = if needle.is_empty() {
            self.songs.clone()
        } else {
            self.songs
                .iter()
                .filter(|song| song.matches(&needle))
                .cloned()
                .collect()
        };

        debug!(source = %self.kind(), query = %query, results = results.len(), "Search");
        Ok(results)
    }

    async fn fetch_details(&self, id: &str) -> Result<Song> {
        self.engine.ensure_alive()?;
        self.songs
            .iter()
            .find(|song| song.id() == id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }
}
