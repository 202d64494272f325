//! # TuneSource
//!
//! Common traits and types for TuneDeck music sources.
//!
//! Every source (local library, streaming mock, remote catalogs) implements
//! [`MusicProvider`]: a search/detail surface plus a uniform transport surface
//! driven by a [`PlaybackEngine`], the simulated progress clock.
//!
//! ## Features
//!
//! - **Uniform transport**: `prepare_playback`, `start_playback`, `pause_playback`,
//!   `stop_playback` and `seek` behave identically for every source.
//! - **Replay-latest streams**: state, progress and current song are exposed as
//!   `tokio::sync::watch` receivers.
//! - **Serialized mutations**: ticks and transport calls of one provider never
//!   interleave.
//! - **Send + Sync**: providers are shared as `Arc<dyn MusicProvider>`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tunesource::{MusicProvider, PlaybackEngine, async_trait};
//!
//! #[derive(Debug)]
//! struct MySource { engine: PlaybackEngine }
//!
//! #[async_trait]
//! impl MusicProvider for MySource {
//!     fn name(&self) -> &str { "My Source" }
//!     fn engine(&self) -> &PlaybackEngine { &self.engine }
//!     async fn search(&self, query: &str) -> Result<Vec<Song>> { ... }
//!     async fn fetch_details(&self, id: &str) -> Result<Song> { ... }
//! }
//! ```

mod engine;
mod error;
mod song;
mod state;

use std::fmt::Debug;

use tokio::sync::watch;

pub use async_trait::async_trait;
pub use engine::{DEFAULT_TICK_INTERVAL, EngineSettings, PlaybackEngine};
pub use error::{Result, SourceError};
pub use song::{Song, SourceKind, format_duration};
pub use state::{PlaybackProgress, PlaybackState};

/// Capability set shared by every music source.
///
/// Implementors provide the catalog half (`search`, `fetch_details`) and hand
/// out their [`PlaybackEngine`]; the transport half and the observable streams
/// have default implementations that delegate to the engine.
///
/// # Examples
///
/// ```ignore
/// let provider: Arc<dyn MusicProvider> = Arc::new(LibrarySource::local_library());
/// let songs = provider.search("song 2").await?;
/// provider.prepare_playback(songs[0].clone()).await?;
/// provider.start_playback().await?;
/// ```
#[async_trait]
pub trait MusicProvider: Debug + Send + Sync {
    // ============= Basic Information =============

    /// Display name of the source
    fn name(&self) -> &str;

    /// The playback engine owned by this provider
    fn engine(&self) -> &PlaybackEngine;

    /// Kind of songs this provider plays
    fn kind(&self) -> SourceKind {
        self.engine().kind()
    }

    // ============= Catalog =============

    /// Searches the catalog
    ///
    /// Matches are case-insensitive substrings of the title, artist or album.
    ///
    /// # Arguments
    ///
    /// * `query` - The search text
    ///
    /// # Returns
    ///
    /// The matching songs, possibly empty
    async fn search(&self, query: &str) -> Result<Vec<Song>>;

    /// Rebuilds a song from its identifier
    ///
    /// # Errors
    ///
    /// Remote catalogs fail with [`SourceError::Decode`] when the payload
    /// cannot be parsed or does not contain `id`.
    async fn fetch_details(&self, id: &str) -> Result<Song>;

    // ============= Transport =============

    /// Loads a song and enters `Loading`
    ///
    /// The state is `Loading` before this returns. The call then waits for
    /// the provider's buffering delay.
    async fn prepare_playback(&self, song: Song) -> Result<()> {
        self.engine().prepare(song).await
    }

    /// Enters `Playing` and starts the progress clock
    async fn start_playback(&self) -> Result<()> {
        self.engine().start().await
    }

    /// Enters `Paused` and freezes the position
    async fn pause_playback(&self) -> Result<()> {
        self.engine().pause().await
    }

    /// Enters `Stopped` and rewinds to 0
    async fn stop_playback(&self) -> Result<()> {
        self.engine().stop().await
    }

    /// Moves the position without a state transition
    async fn seek(&self, time: f64) -> Result<()> {
        self.engine().seek(time).await
    }

    // ============= Observation =============

    fn state(&self) -> watch::Receiver<PlaybackState> {
        self.engine().state()
    }

    fn progress(&self) -> watch::Receiver<PlaybackProgress> {
        self.engine().progress()
    }

    fn current_song(&self) -> watch::Receiver<Option<Song>> {
        self.engine().current_song()
    }

    // ============= Lifecycle =============

    /// Tears the provider down; later transport calls fail with
    /// [`SourceError::Disposed`].
    async fn shutdown(&self) {
        self.engine().shutdown().await
    }

    fn is_disposed(&self) -> bool {
        self.engine().is_disposed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestSource {
        engine: PlaybackEngine,
        songs: Vec<Song>,
    }

    impl TestSource {
        fn new() -> Self {
            Self {
                engine: PlaybackEngine::new(SourceKind::Local, EngineSettings::default()),
                songs: vec![
                    Song::local("1", "First", "Artist", "Album", 10.0, "/1"),
                    Song::local("2", "Second", "Artist", "Album", 20.0, "/2"),
                ],
            }
        }
    }

    #[async_trait]
    impl MusicProvider for TestSource {
        fn name(&self) -> &str {
            "Test Source"
        }

        fn engine(&self) -> &PlaybackEngine {
            &self.engine
        }

        async fn search(&self, query: &str) -> Result<Vec<Song>> {
            let needle = query.to_lowercase();
            Ok(self.songs.iter().filter(|s| s.matches(&needle)).cloned().collect())
        }

        async fn fetch_details(&self, id: &str) -> Result<Song> {
            self.songs
                .iter()
                .find(|s| s.id() == id)
                .cloned()
                .ok_or_else(|| SourceError::NotFound(id.to_string()))
        }
    }

    #[tokio::test]
    async fn test_default_transport_delegates_to_engine() {
        let source = TestSource::new();
        assert_eq!(source.kind(), SourceKind::Local);

        let song = source.fetch_details("2").await.unwrap();
        source.prepare_playback(song).await.unwrap();
        assert_eq!(*source.state().borrow(), PlaybackState::Loading);
        assert_eq!(source.progress().borrow().duration(), 20.0);

        source.start_playback().await.unwrap();
        assert!(source.state().borrow().is_playing());

        source.pause_playback().await.unwrap();
        assert_eq!(*source.state().borrow(), PlaybackState::Paused);

        source.shutdown().await;
        assert!(source.is_disposed());
        assert_eq!(
            source.stop_playback().await.unwrap_err(),
            SourceError::Disposed(SourceKind::Local)
        );
    }

    #[tokio::test]
    async fn test_trait_object_usage() {
        let source: std::sync::Arc<dyn MusicProvider> = std::sync::Arc::new(TestSource::new());
        assert_eq!(source.name(), "Test Source");
        assert_eq!(source.search("second").await.unwrap().len(), 1);
        assert!(matches!(
            source.fetch_details("missing").await,
            Err(SourceError::NotFound(_))
        ));
    }
}
